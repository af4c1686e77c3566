//! Scene File Tests
//!
//! Tests for:
//! - Record tokenization (blocks, comments, field forms)
//! - Decoding into engine conventions (axis remap, UV flip, cone half-angle)
//! - Error reporting with line numbers
//! - JSON form

use glam::{Vec2, Vec3};

use umbra::assets::description::{remap_position, remap_rotation, remap_scale, remap_uv};
use umbra::assets::scenefile::parse_records;
use umbra::{SceneDescription, UmbraError};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

const SCENE: &str = r"
# exported scene
Camera: Camera
Position: 0 -8 2
Rotation: 1.5708 0 0 YXZ
FieldOfView: 0.8
ClipStart: 0.05
ClipEnd: 250
CameraEnd

Mesh: Tri
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
vn 0 0 1
vn 0 0 1
vt 0 0
vt 1 0
vt 0 1
MeshEnd

Material: Painted
baseColor: textures/albedo.png
roughness: textures/rough.png
emissionIntensity: 3.5
MaterialEnd

MeshEntity: Tri.001
Mesh: Tri
Material: Painted
Position: 1 2 3
Scale: 1 2 3
MeshEntityEnd

DirectionalLight: Sun
Intensity: 700
Direction: 0 0 -1
DirectionalLightEnd

PointLight: Bulb
Position: 0 0 2
Intensity: 800
Color: 1 0.9 0.8
Range: 6
UseShadow: 0
PointLightEnd

SpotLight: Cone
Position: 0 0 4
Intensity: 1200
Direction: 0 0 -1
Range: 10
Angle: 1.0
SpotLightEnd

Sky:
SkyImagePath: Sky/sky.exr
skyIntensity: 5000
SkyEnd
";

// ============================================================================
// Tokenizer
// ============================================================================

#[test]
fn records_split_by_block() {
    let records = parse_records(SCENE).expect("valid scene");
    let kinds: Vec<&str> = records.iter().map(|r| r.kind.as_str()).collect();
    assert_eq!(
        kinds,
        [
            "Camera",
            "Mesh",
            "Material",
            "MeshEntity",
            "DirectionalLight",
            "PointLight",
            "SpotLight",
            "Sky"
        ]
    );
    assert_eq!(records[3].name, "Tri.001");
    assert_eq!(records[1].all("v").count(), 3);
}

#[test]
fn field_forms_with_and_without_colon() {
    let records = parse_records("Mesh: M\nv 1 2 3\nvt 0.5 0.25\nMeshEnd\n").expect("valid");
    let field = records[0].field("v").expect("v field");
    assert_eq!(field.floats::<3>().expect("three floats"), [1.0, 2.0, 3.0]);
    assert_eq!(field.line, 2);
}

#[test]
fn unterminated_block_is_an_error() {
    let err = parse_records("Mesh: Open\nv 0 0 0\n").expect_err("missing MeshEnd");
    match err {
        UmbraError::SceneParse { line, message } => {
            assert_eq!(line, 1);
            assert!(message.contains("MeshEnd"), "message: {message}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn stray_line_outside_block_is_an_error() {
    let err = parse_records("# header\nhello world\n").expect_err("not a block");
    assert!(matches!(err, UmbraError::SceneParse { line: 2, .. }), "got {err:?}");
}

// ============================================================================
// Axis conventions
// ============================================================================

#[test]
fn remaps_z_up_to_y_up() {
    assert_eq!(remap_position(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 3.0, -2.0));
    assert_eq!(remap_rotation(Vec3::new(0.1, 0.2, 0.3)), Vec3::new(0.1, 0.3, -0.2));
    assert_eq!(remap_scale(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 3.0, 2.0));
    assert_eq!(remap_uv(Vec2::new(0.25, 0.0)), Vec2::new(0.25, 1.0));
}

// ============================================================================
// Decoding
// ============================================================================

#[test]
fn decodes_every_block() {
    let scene = SceneDescription::from_scenefile(SCENE).expect("valid scene");

    let camera = scene.camera.as_ref().expect("camera");
    assert!(approx_vec(camera.position, Vec3::new(0.0, 2.0, 8.0)), "camera at {}", camera.position);
    assert!(approx(camera.rotation.x, 1.5708), "pitch {}", camera.rotation.x);
    assert!(approx(camera.near, 0.05) && approx(camera.far, 250.0));

    let mesh = scene.mesh("Tri").expect("mesh");
    assert_eq!(mesh.positions.len(), 3);
    assert_eq!(mesh.positions[2], [0.0, 0.0, -1.0]);
    assert_eq!(mesh.normals[0], [0.0, 1.0, 0.0]);
    assert_eq!(mesh.uvs[0], [0.0, 1.0], "uv rows flipped");

    let material = scene.material("Painted").expect("material");
    assert_eq!(material.base_color.as_deref(), Some(std::path::Path::new("textures/albedo.png")));
    assert!(material.metallic.is_none());
    assert!(approx(material.emission_intensity, 3.5));

    let entity = &scene.entities[0];
    assert_eq!((entity.mesh.as_str(), entity.material.as_str()), ("Tri", "Painted"));
    assert!(approx_vec(entity.position, Vec3::new(1.0, 3.0, -2.0)));
    assert!(approx_vec(entity.scale, Vec3::new(1.0, 3.0, 2.0)));

    let sun = scene.directional_light.as_ref().expect("sun");
    assert!(approx_vec(sun.direction, Vec3::new(0.0, -1.0, 0.0)), "sun direction {}", sun.direction);

    let bulb = &scene.point_lights[0];
    assert!(!bulb.use_shadow);
    assert!(approx(bulb.clip_start, 0.1), "default clip start {}", bulb.clip_start);

    let cone = &scene.spot_lights[0];
    assert!(approx(cone.half_angle, 0.5), "half angle {}", cone.half_angle);
    assert!(approx(cone.blend, 0.15));

    let sky = scene.sky.as_ref().expect("sky");
    assert!(approx(sky.intensity, 5000.0));
}

#[test]
fn mismatched_mesh_streams_are_rejected() {
    let text = "Mesh: Bad\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvt 0 0\nMeshEnd\n";
    let err = SceneDescription::from_scenefile(text).expect_err("stream lengths differ");
    assert!(matches!(err, UmbraError::SceneParse { line: 1, .. }), "got {err:?}");
}

#[test]
fn unsupported_euler_order_is_rejected() {
    let text = "Camera: C\nRotation: 0 0 0 XYZ\nCameraEnd\n";
    let err = SceneDescription::from_scenefile(text).expect_err("XYZ order");
    assert!(matches!(err, UmbraError::SceneParse { line: 2, .. }), "got {err:?}");
}

#[test]
fn bad_number_reports_its_line() {
    let text = "PointLight: P\nPosition: 0 0 x\nIntensity: 1\nRange: 1\nPointLightEnd\n";
    let err = SceneDescription::from_scenefile(text).expect_err("bad number");
    assert!(matches!(err, UmbraError::SceneParse { line: 2, .. }), "got {err:?}");
}

#[test]
fn unknown_blocks_are_skipped() {
    let scene = SceneDescription::from_scenefile("Fog: Mist\nDensity: 0.2\nFogEnd\n").expect("skipped");
    assert_eq!(scene, SceneDescription::default());
}

#[test]
fn json_form_matches_text_form() {
    let scene = SceneDescription::from_scenefile(SCENE).expect("valid scene");
    let json = scene.to_json().expect("serializes");
    let back = SceneDescription::from_json(&json).expect("parses");
    assert_eq!(back, scene);
}
