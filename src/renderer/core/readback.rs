//! Blocking GPU → CPU texture readback.
//!
//! Used by the log-average luminance pass (one texel per frame), the
//! prefilter tool (whole faces) and headless tests. Each read is a
//! synchronous round trip: submit, map, wait.

use crate::errors::{Result, UmbraError};

/// Row pitch of a buffer copy, rounded up to wgpu's copy alignment.
#[must_use]
pub const fn padded_bytes_per_row(width: u32, bytes_per_pixel: u32) -> u32 {
    let unpadded = width * bytes_per_pixel;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Staging buffer sized for one mip level of one texture layer.
pub struct TextureReadback {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    bytes_per_pixel: u32,
}

impl TextureReadback {
    #[must_use]
    pub fn new(device: &wgpu::Device, label: &str, width: u32, height: u32, bytes_per_pixel: u32) -> Self {
        let size = u64::from(padded_bytes_per_row(width, bytes_per_pixel)) * u64::from(height);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            width,
            height,
            bytes_per_pixel,
        }
    }

    /// Records a copy of `(mip_level, layer)` of `texture` into the staging buffer.
    pub fn record_copy(&self, encoder: &mut wgpu::CommandEncoder, texture: &wgpu::Texture, mip_level: u32, layer: u32) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level,
                origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row(self.width, self.bytes_per_pixel)),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Maps the buffer, waits for the GPU and returns tightly packed rows.
    ///
    /// The copy must already have been submitted.
    pub fn read(&self, device: &wgpu::Device) -> Result<Vec<u8>> {
        let slice = self.buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            // the receiver only disappears if read() already returned
            let _ = tx.send(result);
        });
        device.poll(wgpu::PollType::wait_indefinitely())?;
        rx.recv()
            .map_err(|_| UmbraError::Readback("map callback was dropped".to_string()))??;

        let padded_row = padded_bytes_per_row(self.width, self.bytes_per_pixel) as usize;
        let row_bytes = (self.width * self.bytes_per_pixel) as usize;
        let mut pixels = Vec::with_capacity(row_bytes * self.height as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks(padded_row).take(self.height as usize) {
                pixels.extend_from_slice(&row[..row_bytes]);
            }
        }
        self.buffer.unmap();
        Ok(pixels)
    }
}

/// Copies one level of `texture` to the CPU in a single submission.
pub fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    mip_level: u32,
    layer: u32,
    bytes_per_pixel: u32,
) -> Result<Vec<u8>> {
    let width = (texture.width() >> mip_level).max(1);
    let height = (texture.height() >> mip_level).max(1);
    let readback = TextureReadback::new(device, "Texture Readback", width, height, bytes_per_pixel);

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Texture Readback Encoder"),
    });
    readback.record_copy(&mut encoder, texture, mip_level, layer);
    queue.submit(std::iter::once(encoder.finish()));

    readback.read(device)
}
