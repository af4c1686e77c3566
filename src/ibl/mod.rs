//! Offline specular IBL prefiltering.
//!
//! Produces the assets the renderer's specular IBL pass samples:
//!
//! ```text
//! <output>/Lut.exr
//! <output>/roughness-0/{pos,neg}-{x,y,z}.exr      256²
//! <output>/roughness-0-25/...                      128²
//! <output>/roughness-0-5/...                        64²
//! <output>/roughness-0-75/...                       32²
//! <output>/roughness-1/...                          16²
//! ```

pub mod baker;
pub mod equirect;
pub mod exr;
pub mod sampling;

use std::path::Path;

use glam::{Vec2, Vec3};

use crate::errors::Result;
use crate::renderer::core::WgpuContext;
use crate::renderer::settings::RendererSettings;
use crate::resources::cube::CubeFace;

pub use baker::{BakedImage, IblBaker};
pub use equirect::EquirectMap;

/// Roughness of each prefiltered mip level and its directory tag.
pub const ROUGHNESS_LEVELS: [(f32, &str); 5] = [(0.0, "0"), (0.25, "0-25"), (0.5, "0-5"), (0.75, "0-75"), (1.0, "1")];

/// Face size of the sharpest level.
pub const FACE_SIZE: u32 = 256;
pub const SAMPLE_COUNT: u32 = 1024;
pub const LUT_SIZE: u32 = 256;
pub const LUT_FILE_NAME: &str = "Lut.exr";

/// Largest per-channel difference tolerated between the GPU LUT and the CPU
/// integration before a warning is logged.
const LUT_TOLERANCE: f32 = 1e-2;

#[inline]
#[must_use]
pub fn face_size(level: usize) -> u32 {
    (FACE_SIZE >> level).max(1)
}

#[must_use]
pub fn level_dir_name(tag: &str) -> String {
    format!("roughness-{tag}")
}

/// Bakes the LUT and the prefiltered cube faces of `input` into `output`.
pub fn prefilter_environment(input: &Path, output: &Path, intensity: f32) -> Result<()> {
    let environment = EquirectMap::load(input)?;
    log::info!(
        "Loaded environment {} ({}x{}), sky intensity {intensity}",
        input.display(),
        environment.width(),
        environment.height()
    );

    let ctx = pollster::block_on(WgpuContext::new_headless(&RendererSettings::default()))?;
    let baker = IblBaker::new(&ctx.device, &ctx.queue, SAMPLE_COUNT);

    std::fs::create_dir_all(output)?;

    let lut = baker.bake_brdf_lut()?;
    spot_check_lut(&lut, baker.sample_count());
    exr::write_rgb32f(&output.join(LUT_FILE_NAME), lut.width, lut.height, &lut.texels)?;
    log::info!("Wrote {}", output.join(LUT_FILE_NAME).display());

    for (_, tag) in ROUGHNESS_LEVELS {
        std::fs::create_dir_all(output.join(level_dir_name(tag)))?;
    }

    baker.bake_specular(&environment, intensity, |level, face, image| {
        if level == 0 {
            spot_check_mirror_face(&environment, intensity, face, image);
        }
        let (_, tag) = ROUGHNESS_LEVELS[level];
        let path = output
            .join(level_dir_name(tag))
            .join(format!("{}.exr", face.file_stem()));
        exr::write_rgb32f(&path, image.width, image.height, &image.texels)?;
        log::info!("Wrote {} ({}x{})", path.display(), image.width, image.height);
        Ok(())
    })
}

/// Compares a few LUT texels against the CPU integral.
fn spot_check_lut(lut: &BakedImage, sample_count: u32) {
    let step = (lut.width / 4).max(1);
    let mut worst = 0.0_f32;
    for y in (step / 2..lut.height).step_by(step as usize) {
        for x in (step / 2..lut.width).step_by(step as usize) {
            let n_dot_v = (x as f32 + 0.5) / lut.width as f32;
            let roughness = (y as f32 + 0.5) / lut.height as f32;
            let expected = sampling::integrate_brdf(n_dot_v, roughness, sample_count);
            let [scale, bias, _, _] = lut.texel(x, y);
            worst = worst.max((scale - expected.x).abs()).max((bias - expected.y).abs());
        }
    }
    if worst > LUT_TOLERANCE {
        log::warn!("BRDF LUT differs from the CPU integration by up to {worst:.4}");
    } else {
        log::debug!("BRDF LUT spot check passed (max error {worst:.5})");
    }
}

/// At zero roughness every GGX sample is the normal itself, so the face
/// centre must reproduce the environment along the face axis.
fn spot_check_mirror_face(environment: &EquirectMap, intensity: f32, face: CubeFace, image: &BakedImage) {
    let (cx, cy) = (image.width / 2, image.height / 2);
    let uv = Vec2::new(
        (cx as f32 + 0.5) / image.width as f32,
        (cy as f32 + 0.5) / image.height as f32,
    );
    let expected = environment.sample(face.direction_at(uv).normalize()) * intensity;
    let [r, g, b, _] = image.texel(cx, cy);
    let error = (Vec3::new(r, g, b) - expected).abs().max_element();
    let scale = expected.max_element().max(1.0);
    if error / scale > LUT_TOLERANCE {
        log::warn!(
            "{} centre texel {:?} differs from the environment {:?}",
            face.file_stem(),
            [r, g, b],
            expected.to_array()
        );
    }
}
