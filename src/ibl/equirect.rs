//! Equirectangular environment maps.
//!
//! `u` wraps around the horizon starting behind `-X`, `v` runs from the
//! zenith (0) to the nadir (1). The sky pass and the prefilter shader use the
//! same mapping.

use std::f32::consts::PI;
use std::path::Path;

use glam::{Vec2, Vec3};

use crate::errors::{Result, UmbraError};

#[must_use]
pub fn direction_to_uv(dir: Vec3) -> Vec2 {
    let u = (-dir.z).atan2(-dir.x) / (2.0 * PI) + 0.5;
    let v = 1.0 - (dir.y.atan2(Vec2::new(dir.x, dir.z).length()) / PI + 0.5);
    Vec2::new(u, v)
}

/// Unit direction for a texture coordinate, inverse of [`direction_to_uv`].
#[must_use]
pub fn uv_to_direction(uv: Vec2) -> Vec3 {
    let phi = (uv.x - 0.5) * 2.0 * PI;
    let elevation = (0.5 - uv.y) * PI;
    let horizontal = elevation.cos();
    Vec3::new(-phi.cos() * horizontal, elevation.sin(), -phi.sin() * horizontal)
}

/// Full-precision RGBA environment image kept on the CPU.
#[derive(Debug, Clone)]
pub struct EquirectMap {
    width: u32,
    height: u32,
    texels: Vec<[f32; 4]>,
}

impl EquirectMap {
    pub fn new(width: u32, height: u32, texels: Vec<[f32; 4]>) -> Result<Self> {
        if width == 0 || height == 0 || texels.len() != (width as usize) * (height as usize) {
            return Err(UmbraError::InvalidArgument(format!(
                "environment map of {width}x{height} with {} texels",
                texels.len()
            )));
        }
        Ok(Self { width, height, texels })
    }

    /// Decodes an EXR/HDR image.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(UmbraError::AssetNotFound(path.display().to_string()));
        }
        let image = image::open(path)?.into_rgba32f();
        let (width, height) = image.dimensions();
        let texels = image
            .as_raw()
            .chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]])
            .collect();
        Self::new(width, height, texels)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn texels(&self) -> &[[f32; 4]] {
        &self.texels
    }

    fn load_wrapped(&self, x: i64, y: i64) -> Vec3 {
        let w = i64::from(self.width);
        let h = i64::from(self.height);
        let x = x.rem_euclid(w);
        let y = y.clamp(0, h - 1);
        let [r, g, b, _] = self.texels[(y * w + x) as usize];
        Vec3::new(r, g, b)
    }

    /// Bilinear lookup along `dir`, wrapping horizontally and clamping at
    /// the poles, like the prefilter shader.
    #[must_use]
    pub fn sample(&self, dir: Vec3) -> Vec3 {
        let p = direction_to_uv(dir) * Vec2::new(self.width as f32, self.height as f32) - 0.5;
        let base = p.floor();
        let f = p - base;
        let (x, y) = (base.x as i64, base.y as i64);

        let top = self.load_wrapped(x, y).lerp(self.load_wrapped(x + 1, y), f.x);
        let bottom = self.load_wrapped(x, y + 1).lerp(self.load_wrapped(x + 1, y + 1), f.x);
        top.lerp(bottom, f.y)
    }
}
