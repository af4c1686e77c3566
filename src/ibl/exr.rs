use std::path::Path;

use crate::errors::{Result, UmbraError};

/// Writes tightly packed RGBA32F texels as an RGB32F OpenEXR file.
pub fn write_rgb32f(path: &Path, width: u32, height: u32, rgba: &[f32]) -> Result<()> {
    let encode_error = |message: String| UmbraError::ImageEncodeError {
        path: path.to_path_buf(),
        message,
    };

    let rgb: Vec<f32> = rgba.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect();
    let expected = (width as usize) * (height as usize) * 3;
    if rgb.len() != expected {
        return Err(encode_error(format!("expected {expected} channels, got {}", rgb.len())));
    }

    let image = image::Rgb32FImage::from_raw(width, height, rgb)
        .ok_or_else(|| encode_error("buffer does not match image size".to_string()))?;
    image
        .save_with_format(path, image::ImageFormat::OpenExr)
        .map_err(|e| encode_error(e.to_string()))
}

/// Reinterprets readback bytes as `f32` channels.
#[must_use]
pub fn texels_from_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
