//! Geometry Tests
//!
//! Tests for:
//! - Camera view/world matrices and Euler order
//! - Entity world bounds under translation, rotation and scale
//! - Sphere vs. axis-aligned box overlap
//! - Cube face tables (selection, per-face directions)

use glam::{Mat4, Vec2, Vec3};

use umbra::assets::{MaterialHandle, MeshHandle};
use umbra::resources::BoundingBox;
use umbra::resources::CubeFace;
use umbra::resources::primitives::{SphereOptions, create_sphere};
use umbra::scene::camera::{derive_rotation_matrix, derive_view_matrix};
use umbra::{Camera, MeshEntity};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

fn unit_cube() -> BoundingBox {
    BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(1.0))
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn view_matrix_inverts_world_matrix() {
    let camera = Camera::new(
        Vec3::new(3.0, -2.0, 7.5),
        Vec3::new(0.3, -1.1, 0.25),
        60f32.to_radians(),
        16.0 / 9.0,
        0.1,
        100.0,
    );
    let product = camera.view_matrix() * camera.world_matrix();
    let identity = Mat4::IDENTITY.to_cols_array();
    for (i, value) in product.to_cols_array().iter().enumerate() {
        assert!(
            approx(*value, identity[i]),
            "view * world element {i}: expected {}, got {value}",
            identity[i]
        );
    }
}

#[test]
fn view_matrix_moves_eye_to_origin() {
    let position = Vec3::new(-4.0, 1.0, 2.0);
    let view = derive_view_matrix(position, Vec3::new(0.2, 0.7, -0.4));
    let eye = view.transform_point3(position);
    assert!(approx_vec(eye, Vec3::ZERO), "eye in view space should be origin, got {eye}");
}

#[test]
fn yaw_applies_before_pitch() {
    // Y-X-Z order: R = Ry * Rx * Rz
    let rotation = Vec3::new(0.4, 0.9, 0.0);
    let expected = Mat4::from_rotation_y(0.9) * Mat4::from_rotation_x(0.4);
    let actual = derive_rotation_matrix(rotation);
    let forward = actual.transform_vector3(Vec3::NEG_Z);
    let expected_forward = expected.transform_vector3(Vec3::NEG_Z);
    assert!(
        approx_vec(forward, expected_forward),
        "forward: expected {expected_forward}, got {forward}"
    );
}

#[test]
fn default_camera_looks_down_negative_z() {
    let camera = Camera::default();
    let forward = camera.rotation_matrix().transform_vector3(Vec3::NEG_Z);
    assert!(approx_vec(forward, Vec3::NEG_Z), "got {forward}");
}

// ============================================================================
// Entity bounds
// ============================================================================

#[test]
fn world_bounds_contain_transformed_corners() {
    let local = BoundingBox::new(Vec3::new(-1.0, -0.5, -2.0), Vec3::new(1.0, 0.5, 2.0));
    let entity = MeshEntity::new(MeshHandle::default(), MaterialHandle::default(), local).with_transform(
        Vec3::new(5.0, -1.0, 3.0),
        Vec3::new(0.3, 1.2, -0.7),
        Vec3::new(2.0, 0.5, 1.5),
    );
    let world = entity.world_bounds();
    let model = entity.model_matrix();

    for corner in local.corners() {
        let p = model.transform_point3(corner);
        let slack = BoundingBox::new(world.min - EPSILON, world.max + EPSILON);
        assert!(
            slack.contains_point(p),
            "transformed corner {p} outside world bounds {:?}..{:?}",
            world.min,
            world.max
        );
    }
}

#[test]
fn identity_transform_keeps_local_bounds() {
    let local = unit_cube();
    let entity = MeshEntity::new(MeshHandle::default(), MaterialHandle::default(), local);
    let world = entity.world_bounds();
    assert!(approx_vec(world.min, local.min), "min: {}", world.min);
    assert!(approx_vec(world.max, local.max), "max: {}", world.max);
}

#[test]
fn generated_sphere_bounds_match_radius() {
    let data = create_sphere(&SphereOptions::default());
    let bounds = data.bounds().expect("sphere has vertices");
    assert!(bounds.min.cmpge(Vec3::splat(-1.0 - 1e-4)).all(), "min {}", bounds.min);
    assert!(bounds.max.cmple(Vec3::splat(1.0 + 1e-4)).all(), "max {}", bounds.max);
    assert!(approx(bounds.max.y, 1.0), "north pole at y = 1, got {}", bounds.max.y);
    assert!(approx(bounds.min.y, -1.0), "south pole at y = -1, got {}", bounds.min.y);
}

#[test]
fn empty_point_set_has_no_bounds() {
    assert!(BoundingBox::from_points(std::iter::empty()).is_none());
}

// ============================================================================
// Sphere vs. box
// ============================================================================

#[test]
fn sphere_outside_box() {
    assert!(!unit_cube().intersects_sphere(Vec3::new(3.0, 0.0, 0.0), 1.9));
    // diagonal: distance to the corner is sqrt(3) * 1
    assert!(!unit_cube().intersects_sphere(Vec3::splat(2.0), 1.7));
}

#[test]
fn sphere_inside_box() {
    assert!(unit_cube().intersects_sphere(Vec3::ZERO, 0.1));
    assert!(unit_cube().intersects_sphere(Vec3::new(0.5, -0.5, 0.2), 0.01));
}

#[test]
fn sphere_tangent_to_face_counts_as_overlap() {
    assert!(unit_cube().intersects_sphere(Vec3::new(3.0, 0.0, 0.0), 2.0));
    assert!(unit_cube().intersects_sphere(Vec3::new(0.0, -1.5, 0.0), 0.5));
}

#[test]
fn sphere_enclosing_box_overlaps() {
    assert!(unit_cube().intersects_sphere(Vec3::new(0.0, 0.0, 10.0), 100.0));
}

// ============================================================================
// Cube faces
// ============================================================================

#[test]
fn face_centre_direction_is_face_axis() {
    for face in CubeFace::ALL {
        let dir = face.direction_at(Vec2::splat(0.5));
        assert!(
            approx_vec(dir, face.direction()),
            "{face:?}: centre direction {dir}, axis {}",
            face.direction()
        );
    }
}

#[test]
fn select_inverts_direction_at() {
    let samples = [Vec2::new(0.1, 0.2), Vec2::new(0.5, 0.9), Vec2::new(0.75, 0.3), Vec2::new(0.95, 0.95)];
    for face in CubeFace::ALL {
        for uv in samples {
            let (selected, back) = CubeFace::select(face.direction_at(uv));
            assert_eq!(selected, face, "uv {uv} of {face:?} selected {selected:?}");
            assert!(
                approx(back.x, uv.x) && approx(back.y, uv.y),
                "{face:?}: uv {uv} came back as {back}"
            );
        }
    }
}

#[test]
fn face_view_projection_keeps_axis_at_centre() {
    let eye = Vec3::new(1.0, 2.0, 3.0);
    for face in CubeFace::ALL {
        let clip = face
            .view_projection(eye, 0.1, 10.0)
            .project_point3(eye + face.direction() * 5.0);
        assert!(
            approx(clip.x, 0.0) && approx(clip.y, 0.0),
            "{face:?}: axis point projected to {clip}"
        );
        assert!(clip.z > 0.0 && clip.z < 1.0, "{face:?}: depth {} outside [0, 1]", clip.z);
    }
}

#[test]
fn face_render_and_sampling_agree_on_rows() {
    // a point rendered near the top row of a face must be found there again
    let eye = Vec3::ZERO;
    for face in CubeFace::ALL {
        let dir = face.direction_at(Vec2::new(0.5, 0.1));
        let clip = face.view_projection(eye, 0.1, 10.0).project_point3(eye + dir);
        // NDC y of +1 is the first texel row in wgpu
        let row = (1.0 - clip.y) * 0.5;
        assert!((row - 0.1).abs() < 1e-4, "{face:?}: row {row}, expected 0.1");
    }
}
