//! Shadow and Light Tests
//!
//! Tests for:
//! - Directional shadow volume fitting
//! - Scene bounds and the empty-scene case
//! - Shadow caster selection for punctual lights
//! - Point light cube matrices and spot light cone terms

use glam::{Vec3, Vec4Swizzles};

use umbra::assets::{MaterialHandle, MeshHandle};
use umbra::renderer::graph::shadow_utils::{casters_in_range, fit_directional_shadow, scene_bounds};
use umbra::resources::{BoundingBox, CubeFace};
use umbra::{Camera, DirectionalLight, MeshEntity, PointLight, Scene, SpotLight};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

fn cube_at(position: Vec3) -> MeshEntity {
    let bounds = BoundingBox::new(Vec3::splat(-0.5), Vec3::splat(0.5));
    MeshEntity::new(MeshHandle::default(), MaterialHandle::default(), bounds).with_transform(
        position,
        Vec3::ZERO,
        Vec3::ONE,
    )
}

// ============================================================================
// Directional shadow volume
// ============================================================================

#[test]
fn light_along_negative_z_keeps_scene_box() {
    let bounds = BoundingBox::new(Vec3::new(-2.0, -1.0, -3.0), Vec3::new(4.0, 5.0, 1.0));
    let volume = fit_directional_shadow(Vec3::NEG_Z, &bounds);
    assert!(approx_vec(volume.bounds.min, bounds.min), "min {}", volume.bounds.min);
    assert!(approx_vec(volume.bounds.max, bounds.max), "max {}", volume.bounds.max);
}

#[test]
fn fitted_volume_encloses_scene_in_clip_space() {
    let bounds = BoundingBox::new(Vec3::new(-3.0, 0.0, -2.0), Vec3::new(3.0, 2.0, 2.0));
    let volume = fit_directional_shadow(Vec3::new(-0.5, -1.0, -0.5), &bounds);
    let view_projection = volume.view_projection();
    for corner in bounds.corners() {
        let clip = view_projection * corner.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        assert!(
            ndc.x.abs() <= 1.0 + EPSILON && ndc.y.abs() <= 1.0 + EPSILON,
            "corner {corner} projected to {ndc}"
        );
        assert!((-EPSILON..=1.0 + EPSILON).contains(&ndc.z), "corner {corner} depth {}", ndc.z);
    }
}

#[test]
fn light_direction_maps_to_negative_z() {
    let direction = Vec3::new(1.0, -2.0, 0.5).normalize();
    let volume = fit_directional_shadow(direction, &BoundingBox::new(Vec3::ZERO, Vec3::ONE));
    let rotated = volume.rotation * direction;
    assert!(approx_vec(rotated, Vec3::NEG_Z), "rotated direction {rotated}");
}

#[test]
fn scene_without_entities_has_no_shadow_volume() {
    let mut scene = Scene::new(Camera::default());
    scene.directional_light = Some(DirectionalLight::new(700.0, Vec3::NEG_Y, Vec3::ONE));
    assert!(scene.bounds().is_none());
    assert!(scene.directional_shadow_volume().is_none());
}

#[test]
fn scene_without_light_has_no_shadow_volume() {
    let mut scene = Scene::new(Camera::default());
    scene.entities.push(cube_at(Vec3::ZERO));
    assert!(scene.directional_shadow_volume().is_none());
}

#[test]
fn scene_bounds_union_entities() {
    let entities = vec![cube_at(Vec3::new(-3.0, 0.0, 0.0)), cube_at(Vec3::new(2.0, 1.0, -4.0))];
    let bounds = scene_bounds(&entities).expect("two entities");
    assert!(approx_vec(bounds.min, Vec3::new(-3.5, -0.5, -4.5)), "min {}", bounds.min);
    assert!(approx_vec(bounds.max, Vec3::new(2.5, 1.5, 0.5)), "max {}", bounds.max);
}

// ============================================================================
// Caster selection
// ============================================================================

#[test]
fn casters_in_range_skips_distant_entities() {
    let entities = vec![
        cube_at(Vec3::ZERO),
        cube_at(Vec3::new(10.0, 0.0, 0.0)),
        cube_at(Vec3::new(0.0, 3.0, 0.0)),
    ];
    let casters = casters_in_range(&entities, Vec3::ZERO, 2.6);
    assert_eq!(casters.as_slice(), &[0, 2], "selected {casters:?}");
}

#[test]
fn casters_in_range_empty_scene() {
    assert!(casters_in_range(&[], Vec3::ZERO, 100.0).is_empty());
}

// ============================================================================
// Punctual lights
// ============================================================================

#[test]
fn point_light_faces_follow_cube_layers() {
    let light = PointLight::new(Vec3::new(1.0, 2.0, -1.0), 800.0, Vec3::ONE, 10.0);
    let matrices = light.face_view_projections();
    for face in CubeFace::ALL {
        let target = light.position + face.direction() * 4.0;
        let ndc = matrices[face.layer() as usize].project_point3(target);
        assert!(
            approx(ndc.x, 0.0) && approx(ndc.y, 0.0),
            "{face:?}: axis point at {ndc}"
        );
    }
}

#[test]
fn point_light_volume_covers_range() {
    let light = PointLight::new(Vec3::new(0.0, 1.0, 0.0), 800.0, Vec3::ONE, 5.0);
    let edge = light.volume_model_matrix().transform_point3(Vec3::X);
    assert!(
        edge.distance(light.position) >= light.range,
        "volume radius {} smaller than range {}",
        edge.distance(light.position),
        light.range
    );
}

#[test]
fn spot_cone_cosines_order() {
    let mut light = SpotLight::new(Vec3::ZERO, Vec3::NEG_Y, 800.0, Vec3::ONE, 10.0, 30f32.to_radians());
    light.blend = 0.2;
    let (inner, outer) = light.cone_cosines();
    assert!(approx(outer, 30f32.to_radians().cos()), "outer {outer}");
    assert!(approx(inner, 24f32.to_radians().cos()), "inner {inner}");
    assert!(inner > outer, "inner edge {inner} should be closer to the axis than {outer}");
}

#[test]
fn spot_view_projection_centres_axis() {
    // straight down exercises the alternate up vector
    let light = SpotLight::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 800.0, Vec3::ONE, 10.0, 0.5);
    let ndc = light.view_projection().project_point3(Vec3::new(0.0, 1.0, 0.0));
    assert!(approx(ndc.x, 0.0) && approx(ndc.y, 0.0), "axis point at {ndc}");
    assert!(ndc.z > 0.0 && ndc.z < 1.0, "depth {}", ndc.z);
}

#[test]
fn directional_direction_is_normalized() {
    let light = DirectionalLight::new(700.0, Vec3::new(-0.5, -1.0, -0.5), Vec3::ONE);
    assert!(approx(light.direction().length(), 1.0), "length {}", light.direction().length());
}
