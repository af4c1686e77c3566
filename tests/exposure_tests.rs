//! Auto-Exposure Tests
//!
//! Tests for:
//! - Camera settings clamped to their physical ranges
//! - Zero time step leaves the exposure unchanged
//! - Adaptation converges towards the measured luminance
//! - Brighter scenes get smaller exposure multipliers

use umbra::PhysicallyBasedCamera;
use umbra::scene::physical_camera::{APERTURE_RANGE, ISO_RANGE, SHUTTER_RANGE};

const EPSILON: f32 = 1e-6;

fn in_range(value: f32, (lo, hi): (f32, f32)) -> bool {
    value >= lo - EPSILON && value <= hi + EPSILON
}

// ============================================================================
// Ranges
// ============================================================================

#[test]
fn settings_stay_in_range_for_extreme_luminance() {
    for luminance in [1e-6, 0.01, 1.0, 100.0, 1e4, 1e7] {
        let camera = PhysicallyBasedCamera::new(luminance, 0.0);
        assert!(in_range(camera.aperture(), APERTURE_RANGE), "L={luminance}: aperture {}", camera.aperture());
        assert!(
            in_range(camera.shutter_speed(), SHUTTER_RANGE),
            "L={luminance}: shutter {}",
            camera.shutter_speed()
        );
        assert!(in_range(camera.iso(), ISO_RANGE), "L={luminance}: iso {}", camera.iso());
        assert!(
            camera.exposure().is_finite() && camera.exposure() > 0.0,
            "L={luminance}: exposure {}",
            camera.exposure()
        );
    }
}

// ============================================================================
// Adaptation
// ============================================================================

#[test]
fn zero_delta_time_is_idempotent() {
    let mut camera = PhysicallyBasedCamera::new(2.0, 0.0);
    let before = camera;
    camera.update(500.0, 0.0);
    camera.update(0.001, 0.0);
    assert_eq!(camera.average_luminance(), before.average_luminance());
    assert_eq!(camera.exposure(), before.exposure(), "exposure drifted with dt = 0");
}

#[test]
fn adaptation_converges_to_measurement() {
    let mut camera = PhysicallyBasedCamera::new(1.0, 0.0);
    for _ in 0..200 {
        camera.update(50.0, 0.1);
    }
    let error = (camera.average_luminance() - 50.0).abs();
    assert!(error < 1e-3, "average luminance {} after 20 s", camera.average_luminance());
}

#[test]
fn adaptation_moves_monotonically() {
    let mut camera = PhysicallyBasedCamera::new(1.0, 0.0);
    let mut previous = camera.average_luminance();
    for step in 0..20 {
        camera.update(10.0, 0.05);
        let current = camera.average_luminance();
        assert!(current > previous && current < 10.0, "step {step}: {previous} -> {current}");
        previous = current;
    }
}

#[test]
fn non_finite_measurement_is_ignored() {
    let mut camera = PhysicallyBasedCamera::new(3.0, 0.0);
    camera.update(f32::NAN, 1.0);
    assert_eq!(camera.average_luminance(), 3.0);
    camera.update(f32::INFINITY, 1.0);
    assert_eq!(camera.average_luminance(), 3.0);
}

#[test]
fn brighter_scene_lowers_exposure() {
    let dim = PhysicallyBasedCamera::new(0.5, 0.0);
    let bright = PhysicallyBasedCamera::new(500.0, 0.0);
    assert!(
        bright.exposure() < dim.exposure(),
        "bright exposure {} should be below dim exposure {}",
        bright.exposure(),
        dim.exposure()
    );
}

#[test]
fn compensation_brightens_image() {
    let neutral = PhysicallyBasedCamera::new(5.0, 0.0);
    let compensated = PhysicallyBasedCamera::new(5.0, 1.0);
    assert!(
        compensated.exposure() > neutral.exposure(),
        "+1 EV exposure {} should exceed neutral {}",
        compensated.exposure(),
        neutral.exposure()
    );
}
