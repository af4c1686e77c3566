//! GPU textures loaded from image files.
//!
//! Every [`Texture`] owns exactly one `wgpu::Texture` through an
//! [`Owned`] handle. Loading is synchronous; the `load_*` constructors return
//! `Err` on missing or corrupt files and leave the fallback policy to the
//! asset store.

use std::path::Path;

use half::f16;

use crate::errors::{Result, UmbraError};
use crate::ibl::{ROUGHNESS_LEVELS, level_dir_name};
use crate::renderer::core::MipmapGenerator;
use crate::renderer::core::mipmap::full_mip_count;
use crate::resources::cube::CubeFace;
use crate::resources::handle::Owned;

/// Whether texel values are sRGB-encoded colors or linear data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

/// Sampler wrapping of a 2D texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    /// Tiles on both axes (material maps).
    Repeat,
    /// Clamps on both axes (lookup tables).
    Clamp,
    /// Wraps around the horizon and clamps at the poles (latitude-longitude
    /// sky maps).
    Equirect,
}

impl AddressMode {
    /// `(u, v)` sampler address modes.
    #[must_use]
    pub fn uv(self) -> (wgpu::AddressMode, wgpu::AddressMode) {
        match self {
            AddressMode::Repeat => (wgpu::AddressMode::Repeat, wgpu::AddressMode::Repeat),
            AddressMode::Clamp => (wgpu::AddressMode::ClampToEdge, wgpu::AddressMode::ClampToEdge),
            AddressMode::Equirect => (wgpu::AddressMode::Repeat, wgpu::AddressMode::ClampToEdge),
        }
    }
}

pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[derive(Debug, Default)]
pub struct Texture {
    raw: Owned<wgpu::Texture>,
    view: Option<wgpu::TextureView>,
    sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Texture that owns nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Moves the GPU texture out, leaving `self` empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            raw: self.raw.take(),
            view: self.view.take(),
            sampler: self.sampler.take(),
        }
    }

    /// Destroys the current texture and takes over `source`.
    pub fn assign(&mut self, source: &mut Texture) {
        self.raw.assign(&mut source.raw);
        self.view = source.view.take();
        self.sampler = source.sampler.take();
    }

    #[must_use]
    pub fn raw(&self) -> Option<&wgpu::Texture> {
        self.raw.get()
    }

    #[must_use]
    pub fn view(&self) -> Option<&wgpu::TextureView> {
        self.view.as_ref()
    }

    #[must_use]
    pub fn sampler(&self) -> Option<&wgpu::Sampler> {
        self.sampler.as_ref()
    }

    fn from_parts(texture: wgpu::Texture, view: wgpu::TextureView, sampler: wgpu::Sampler) -> Self {
        Self {
            raw: Owned::new(texture),
            view: Some(view),
            sampler: Some(sampler),
        }
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    /// 1x1 texture of a single color, used to fill absent material slots.
    #[must_use]
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4], color_space: ColorSpace, label: &str) -> Self {
        Self::from_rgba8(device, queue, None, label, 1, 1, &rgba, color_space)
    }

    /// 8-bit RGBA texture with an optional full mip chain.
    #[must_use]
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mipmaps: Option<&MipmapGenerator>,
        label: &str,
        width: u32,
        height: u32,
        data: &[u8],
        color_space: ColorSpace,
    ) -> Self {
        let format = match color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        };
        Self::upload_2d(device, queue, mipmaps, label, width, height, format, data, 4, AddressMode::Repeat)
    }

    /// Decodes an LDR image file (PNG/JPEG) and uploads it with mipmaps.
    pub fn load_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mipmaps: &MipmapGenerator,
        path: &Path,
        color_space: ColorSpace,
    ) -> Result<Self> {
        if !path.exists() {
            return Err(UmbraError::AssetNotFound(path.display().to_string()));
        }
        let image = image::open(path)?.into_rgba8();
        let (width, height) = image.dimensions();
        let label = path.display().to_string();
        Ok(Self::from_rgba8(device, queue, Some(mipmaps), &label, width, height, image.as_raw(), color_space))
    }

    /// Decodes a floating-point image (EXR/HDR) into a half-float texture.
    ///
    /// With `mipmaps` the texture gets a full mip chain and is sampled as an
    /// equirectangular sky ([`AddressMode::Equirect`]); without, it is
    /// clamped and single-level (lookup tables).
    pub fn load_hdr(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mipmaps: Option<&MipmapGenerator>,
        path: &Path,
    ) -> Result<Self> {
        let (width, height, texels) = read_hdr_half(path)?;
        let label = path.display().to_string();
        let address = if mipmaps.is_some() { AddressMode::Equirect } else { AddressMode::Clamp };
        Ok(Self::upload_2d(
            device,
            queue,
            mipmaps,
            &label,
            width,
            height,
            HDR_FORMAT,
            bytemuck::cast_slice(&texels),
            8,
            address,
        ))
    }

    /// Loads a prefiltered specular cubemap from the baked directory layout:
    /// one `roughness-*` directory per mip level, six face files each.
    pub fn load_specular_cubemap(device: &wgpu::Device, queue: &wgpu::Queue, dir: &Path) -> Result<Self> {
        let mut levels = Vec::with_capacity(ROUGHNESS_LEVELS.len());
        for (_, tag) in ROUGHNESS_LEVELS {
            let level_dir = dir.join(level_dir_name(tag));
            let mut faces = Vec::with_capacity(6);
            for face in CubeFace::ALL {
                faces.push(read_hdr_half(&level_dir.join(format!("{}.exr", face.file_stem())))?);
            }
            levels.push(faces);
        }

        let base = levels[0][0].0;
        for (level, faces) in levels.iter().enumerate() {
            let expected = (base >> level).max(1);
            if let Some((w, h, _)) = faces.iter().find(|(w, h, _)| *w != expected || *h != expected) {
                return Err(UmbraError::CubeMapError(format!(
                    "{}: level {level} face is {w}x{h}, expected {expected}x{expected}",
                    dir.display()
                )));
            }
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Specular IBL Cubemap"),
            size: wgpu::Extent3d {
                width: base,
                height: base,
                depth_or_array_layers: 6,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: HDR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, faces) in levels.iter().enumerate() {
            for (layer, (size, _, texels)) in faces.iter().enumerate() {
                queue.write_texture(
                    wgpu::TexelCopyTextureInfo {
                        texture: &texture,
                        mip_level: level as u32,
                        origin: wgpu::Origin3d { x: 0, y: 0, z: layer as u32 },
                        aspect: wgpu::TextureAspect::All,
                    },
                    bytemuck::cast_slice(texels),
                    wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(size * 8),
                        rows_per_image: Some(*size),
                    },
                    wgpu::Extent3d {
                        width: *size,
                        height: *size,
                        depth_or_array_layers: 1,
                    },
                );
            }
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Specular IBL Cube View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = create_sampler(device, "Specular IBL Sampler", AddressMode::Clamp, true);
        Ok(Self::from_parts(texture, view, sampler))
    }

    fn upload_2d(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mipmaps: Option<&MipmapGenerator>,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        data: &[u8],
        bytes_per_pixel: u32,
        address: AddressMode,
    ) -> Self {
        let mip_level_count = if mipmaps.is_some() { full_mip_count(width, height) } else { 1 };
        let mut usage = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
        if mip_level_count > 1 {
            usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * bytes_per_pixel),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        if let Some(generator) = mipmaps.filter(|_| mip_level_count > 1) {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Mipmap Encoder"),
            });
            generator.generate(device, &mut encoder, &texture);
            queue.submit(std::iter::once(encoder.finish()));
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = create_sampler(device, label, address, mip_level_count > 1);
        Self::from_parts(texture, view, sampler)
    }
}

fn create_sampler(device: &wgpu::Device, label: &str, address: AddressMode, mipmapped: bool) -> wgpu::Sampler {
    let (address_mode_u, address_mode_v) = address.uv();
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u,
        address_mode_v,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: if mipmapped {
            wgpu::MipmapFilterMode::Linear
        } else {
            wgpu::MipmapFilterMode::Nearest
        },
        ..Default::default()
    })
}

/// Reads a float image as tightly packed RGBA half floats.
fn read_hdr_half(path: &Path) -> Result<(u32, u32, Vec<f16>)> {
    if !path.exists() {
        return Err(UmbraError::AssetNotFound(path.display().to_string()));
    }
    let image = image::open(path)?.into_rgba32f();
    let (width, height) = image.dimensions();
    let texels = image.as_raw().iter().map(|&v| f16::from_f32(v)).collect();
    Ok((width, height, texels))
}
