//! Pass State Tests
//!
//! Tests for:
//! - Light volume stencil counting over a simulated fragment sequence
//! - Sky / surface lighting selection by the geometry marker
//! - Blend and write masks of the accumulation passes

use umbra::renderer::graph::{BlendMode, PassState};
use wgpu::Face;

const MARKER: u32 = 128;

/// One proxy-sphere fragment: the face it belongs to and whether it lies in
/// front of the stored scene depth.
struct Fragment {
    face: Face,
    in_front_of_surface: bool,
}

fn count(fragments: &[Fragment]) -> u8 {
    let state = PassState::LIGHT_VOLUME_STENCIL;
    fragments.iter().fold(0u8, |stored, f| {
        state.stencil_update(f.face, stored, f.in_front_of_surface)
    })
}

// ============================================================================
// Light volume stencil
// ============================================================================

#[test]
fn surface_inside_volume_is_marked() {
    // camera outside: front face in front of the surface, back face behind it
    let stored = count(&[
        Fragment {
            face: Face::Front,
            in_front_of_surface: true,
        },
        Fragment {
            face: Face::Back,
            in_front_of_surface: false,
        },
    ]);
    assert_ne!(stored, 0, "surface inside the sphere must leave a non-zero count");
    assert!(PassState::LIGHT_VOLUME_SHADING.stencil_test(Face::Back, stored));
}

#[test]
fn surface_behind_volume_is_not_marked() {
    // both faces in front of the surface: no depth failures
    let stored = count(&[
        Fragment {
            face: Face::Front,
            in_front_of_surface: true,
        },
        Fragment {
            face: Face::Back,
            in_front_of_surface: true,
        },
    ]);
    assert_eq!(stored, 0);
    assert!(!PassState::LIGHT_VOLUME_SHADING.stencil_test(Face::Back, stored));
}

#[test]
fn surface_in_front_of_volume_is_not_marked() {
    // both faces hidden behind a nearer surface: increment and decrement cancel
    let stored = count(&[
        Fragment {
            face: Face::Front,
            in_front_of_surface: false,
        },
        Fragment {
            face: Face::Back,
            in_front_of_surface: false,
        },
    ]);
    assert_eq!(stored, 0, "depth-fail on both faces must cancel, got {stored}");
}

#[test]
fn camera_inside_volume_marks_enclosed_surface() {
    // front faces are behind the camera and never rasterized
    let stored = count(&[Fragment {
        face: Face::Back,
        in_front_of_surface: false,
    }]);
    assert_eq!(stored, 1);
}

#[test]
fn back_face_depth_fail_increments_and_front_decrements() {
    let state = PassState::LIGHT_VOLUME_STENCIL;
    assert_eq!(state.stencil_update(Face::Back, 3, false), 4);
    assert_eq!(state.stencil_update(Face::Front, 3, false), 2);
    assert_eq!(state.stencil_update(Face::Front, 0, false), 255, "decrement wraps");
    assert_eq!(state.stencil_update(Face::Back, 3, true), 3, "depth pass keeps");
}

#[test]
fn stencil_pass_writes_no_color() {
    let target = PassState::LIGHT_VOLUME_STENCIL
        .color_target(wgpu::TextureFormat::Rgba16Float)
        .expect("stencil pass keeps the color target");
    assert!(target.write_mask.is_empty(), "write mask {:?}", target.write_mask);
}

// ============================================================================
// Marker selection
// ============================================================================

#[test]
fn geometry_writes_marker() {
    let geometry = PassState::GEOMETRY.with_stencil_marker(MARKER);
    assert_eq!(geometry.stencil_update(Face::Front, 0, true), MARKER as u8);
}

#[test]
fn sky_draws_only_background() {
    let sky = PassState::SKY.with_stencil_marker(MARKER);
    assert!(sky.stencil_test(Face::Front, 0));
    assert!(!sky.stencil_test(Face::Front, MARKER as u8));
}

#[test]
fn surface_lighting_draws_only_covered_pixels() {
    let lighting = PassState::SURFACE_LIGHTING.with_stencil_marker(MARKER);
    assert!(lighting.stencil_test(Face::Front, MARKER as u8));
    assert!(!lighting.stencil_test(Face::Front, 0));
}

#[test]
fn custom_marker_bit() {
    let marker = 4;
    let lighting = PassState::SURFACE_LIGHTING.with_stencil_marker(marker);
    let sky = PassState::SKY.with_stencil_marker(marker);
    assert!(lighting.stencil_test(Face::Front, marker as u8));
    assert!(sky.stencil_test(Face::Front, 128), "other bits are masked out");
}

// ============================================================================
// Blending
// ============================================================================

#[test]
fn lighting_passes_accumulate() {
    for state in [
        PassState::SURFACE_LIGHTING,
        PassState::LIGHT_VOLUME_SHADING,
    ] {
        assert_eq!(state.blend, BlendMode::Additive);
        assert!(!state.depth_write);
    }
    assert_eq!(PassState::LIGHT_VOLUME_SHADING.cull, Some(Face::Front));
}
