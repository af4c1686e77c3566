//! Image-Based Lighting Tests
//!
//! Tests for:
//! - Hammersley low-discrepancy points
//! - GGX importance sampling
//! - Split-sum BRDF integration ranges
//! - Equirectangular mapping and bilinear lookup
//! - Prefilter output layout
//! - GPU bakes against the CPU integration (skipped without an adapter)

use glam::{Vec2, Vec3};

use umbra::ibl::equirect::{EquirectMap, direction_to_uv, uv_to_direction};
use umbra::ibl::sampling::{hammersley, importance_sample_ggx, integrate_brdf, radical_inverse};
use umbra::ibl::{FACE_SIZE, IblBaker, LUT_SIZE, ROUGHNESS_LEVELS, face_size, level_dir_name};
use umbra::resources::AddressMode;
use umbra::{RendererSettings, WgpuContext};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

fn headless() -> Option<WgpuContext> {
    let _ = env_logger::builder().is_test(true).try_init();
    match pollster::block_on(WgpuContext::new_headless(&RendererSettings::default())) {
        Ok(ctx) => Some(ctx),
        Err(err) => {
            eprintln!("skipping GPU test: {err}");
            None
        }
    }
}

// ============================================================================
// Hammersley
// ============================================================================

#[test]
fn radical_inverse_mirrors_bits() {
    assert!(approx(radical_inverse(0), 0.0));
    assert!(approx(radical_inverse(1), 0.5));
    assert!(approx(radical_inverse(2), 0.25));
    assert!(approx(radical_inverse(3), 0.75));
}

#[test]
fn hammersley_points_stay_in_unit_square() {
    let count = 256;
    for i in 0..count {
        let p = hammersley(i, count);
        assert!(
            (0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y),
            "point {i} = {p} outside [0, 1)"
        );
    }
    assert!(approx(hammersley(128, 256).x, 0.5));
}

// ============================================================================
// GGX sampling
// ============================================================================

#[test]
fn zero_roughness_returns_normal() {
    let normals = [Vec3::Z, Vec3::Y, Vec3::new(1.0, -2.0, 0.5).normalize(), Vec3::NEG_Z];
    for n in normals {
        for i in 0..16 {
            let h = importance_sample_ggx(hammersley(i, 16), n, 0.0);
            assert!(approx_vec(h, n), "roughness 0 sample {i} around {n} gave {h}");
        }
    }
}

#[test]
fn samples_lie_in_upper_hemisphere() {
    let n = Vec3::new(0.3, 0.8, -0.2).normalize();
    for roughness in [0.25, 0.5, 1.0] {
        for i in 0..64 {
            let h = importance_sample_ggx(hammersley(i, 64), n, roughness);
            assert!(approx(h.length(), 1.0), "sample {i} not unit: {}", h.length());
            assert!(h.dot(n) >= -EPSILON, "roughness {roughness} sample {i} below horizon");
        }
    }
}

#[test]
fn rougher_lobes_spread_further() {
    let spread = |roughness: f32| -> f32 {
        (0..128)
            .map(|i| importance_sample_ggx(hammersley(i, 128), Vec3::Z, roughness).z)
            .sum::<f32>()
            / 128.0
    };
    let smooth = spread(0.25);
    let rough = spread(0.9);
    assert!(rough < smooth, "mean cos(theta): rough {rough}, smooth {smooth}");
}

// ============================================================================
// BRDF integration
// ============================================================================

#[test]
fn brdf_terms_are_bounded() {
    for n_dot_v in [0.05, 0.25, 0.5, 0.75, 1.0] {
        for roughness in [0.05, 0.3, 0.6, 1.0] {
            let v = integrate_brdf(n_dot_v, roughness, 256);
            assert!(
                v.x >= 0.0 && v.y >= 0.0 && v.x + v.y <= 1.0 + 1e-2,
                "N.V {n_dot_v}, roughness {roughness}: scale {} bias {}",
                v.x,
                v.y
            );
        }
    }
}

#[test]
fn smooth_head_on_reflection_is_total() {
    let v = integrate_brdf(1.0, 0.05, 256);
    assert!(v.x > 0.95, "scale {} should approach 1", v.x);
    assert!(v.y < 0.05, "bias {} should approach 0", v.y);
}

#[test]
fn grazing_angles_raise_the_fresnel_bias() {
    let head_on = integrate_brdf(1.0, 0.3, 256);
    let grazing = integrate_brdf(0.1, 0.3, 256);
    assert!(grazing.y > head_on.y, "bias grazing {} head-on {}", grazing.y, head_on.y);
}

// ============================================================================
// Equirectangular mapping
// ============================================================================

#[test]
fn uv_direction_round_trip() {
    for uv in [Vec2::new(0.1, 0.3), Vec2::new(0.5, 0.5), Vec2::new(0.8, 0.7), Vec2::new(0.3, 0.9)] {
        let back = direction_to_uv(uv_to_direction(uv));
        assert!(approx(back.x, uv.x) && approx(back.y, uv.y), "uv {uv} came back as {back}");
    }
}

#[test]
fn zenith_maps_to_top_row() {
    assert!(approx(direction_to_uv(Vec3::Y).y, 0.0));
    assert!(approx(direction_to_uv(Vec3::NEG_Y).y, 1.0));
    assert!(approx(direction_to_uv(Vec3::X).y, 0.5));
}

#[test]
fn constant_map_samples_constant() {
    let map = EquirectMap::new(8, 4, vec![[2.0, 1.0, 0.5, 1.0]; 32]).expect("valid map");
    for dir in [Vec3::X, Vec3::Y, Vec3::NEG_Z, Vec3::new(1.0, -1.0, 1.0).normalize()] {
        let sample = map.sample(dir);
        assert!(approx_vec(sample, Vec3::new(2.0, 1.0, 0.5)), "{dir}: {sample}");
    }
}

#[test]
fn equirect_sampler_wraps_horizontally_only() {
    assert_eq!(
        AddressMode::Equirect.uv(),
        (wgpu::AddressMode::Repeat, wgpu::AddressMode::ClampToEdge)
    );
    assert_eq!(AddressMode::Repeat.uv(), (wgpu::AddressMode::Repeat, wgpu::AddressMode::Repeat));
    assert_eq!(
        AddressMode::Clamp.uv(),
        (wgpu::AddressMode::ClampToEdge, wgpu::AddressMode::ClampToEdge)
    );
}

#[test]
fn map_size_mismatch_is_rejected() {
    assert!(EquirectMap::new(4, 4, vec![[0.0; 4]; 15]).is_err());
    assert!(EquirectMap::new(0, 4, Vec::new()).is_err());
}

// ============================================================================
// Output layout
// ============================================================================

#[test]
fn levels_halve_face_size() {
    assert_eq!(ROUGHNESS_LEVELS.len(), 5);
    assert_eq!(face_size(0), FACE_SIZE);
    for level in 1..ROUGHNESS_LEVELS.len() {
        assert_eq!(face_size(level), face_size(level - 1) / 2, "level {level}");
    }
    assert_eq!(face_size(4), 16);
}

#[test]
fn level_directories_follow_roughness() {
    let names: Vec<String> = ROUGHNESS_LEVELS.iter().map(|(_, tag)| level_dir_name(tag)).collect();
    assert_eq!(
        names,
        ["roughness-0", "roughness-0-25", "roughness-0-5", "roughness-0-75", "roughness-1"]
    );
    for pair in ROUGHNESS_LEVELS.windows(2) {
        assert!(pair[0].0 < pair[1].0);
    }
}

// ============================================================================
// GPU bakes
// ============================================================================

#[test]
fn gpu_lut_matches_cpu_integration() -> anyhow::Result<()> {
    let Some(ctx) = headless() else { return Ok(()) };
    let sample_count = 64;
    let lut = IblBaker::new(&ctx.device, &ctx.queue, sample_count).bake_brdf_lut()?;
    assert_eq!((lut.width, lut.height), (LUT_SIZE, LUT_SIZE));

    for (i, value) in lut.texels.iter().enumerate() {
        assert!(value.is_finite(), "texel {} channel {} is {value}", i / 4, i % 4);
    }

    let size = LUT_SIZE as f32;
    let texels = [
        (LUT_SIZE / 16, 0),
        (LUT_SIZE / 16, LUT_SIZE - 1),
        (LUT_SIZE / 2, LUT_SIZE / 3),
        (LUT_SIZE - 1, 0),
        (LUT_SIZE - 1, LUT_SIZE - 1),
    ];
    for (x, y) in texels {
        let expected = integrate_brdf((x as f32 + 0.5) / size, (y as f32 + 0.5) / size, sample_count);
        let [scale, bias, _, _] = lut.texel(x, y);
        assert!(
            (scale - expected.x).abs() < 1e-2 && (bias - expected.y).abs() < 1e-2,
            "texel ({x}, {y}): gpu ({scale}, {bias}), cpu {expected}"
        );
    }
    Ok(())
}

#[test]
fn gpu_prefilter_of_constant_sky_is_constant() -> anyhow::Result<()> {
    let Some(ctx) = headless() else { return Ok(()) };
    let sky = EquirectMap::new(8, 4, vec![[0.5, 0.25, 1.0, 1.0]; 32])?;
    let expected = Vec3::new(1.0, 0.5, 2.0);

    let mut faces = 0;
    IblBaker::new(&ctx.device, &ctx.queue, 16).bake_specular(&sky, 2.0, |level, face, image| {
        assert_eq!(image.width, face_size(level));
        for y in (0..image.height).step_by(7) {
            for x in (0..image.width).step_by(7) {
                let [r, g, b, _] = image.texel(x, y);
                let texel = Vec3::new(r, g, b);
                assert!(
                    (texel - expected).abs().max_element() < 1e-3,
                    "level {level} {face:?} ({x}, {y}) = {texel}"
                );
            }
        }
        faces += 1;
        Ok(())
    })?;
    assert_eq!(faces, ROUGHNESS_LEVELS.len() * 6);
    Ok(())
}
