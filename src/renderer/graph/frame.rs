//! Frame buffers.
//!
//! [`FrameBuffers`] owns every screen-sized texture of the deferred path and
//! lends them to the passes by reference:
//!
//! | target | format | written by | read by |
//! |---|---|---|---|
//! | G-buffer 0 | `Rgba8Unorm` albedo + metallic | geometry | lighting |
//! | G-buffer 1 | `Rgba16Float` emissive + linear depth | geometry | lighting |
//! | G-buffer 2 | `Rgba16Float` normal + roughness | geometry | lighting |
//! | G-buffer depth | `Depth24PlusStencil8` | geometry | copied to HDR depth |
//! | HDR | `Rgba16Float` | sky, lighting | log luminance, exposure |
//! | HDR depth | `Depth24PlusStencil8` | stencil light volumes | |
//! | luminance | `Rgba16Float`, full mip chain | log luminance | readback |
//! | exposed | `Rgba16Float` | exposure | tone mapping |
//!
//! Sizes are fixed for the lifetime of the renderer.

use half::f16;

use crate::errors::{Result, UmbraError};
use crate::renderer::core::mipmap::full_mip_count;
use crate::renderer::core::readback::TextureReadback;
use crate::renderer::graph::pipeline::texture_entry;
use crate::resources::texture::HDR_FORMAT;

pub const GBUFFER_FORMATS: [wgpu::TextureFormat; 3] = [
    wgpu::TextureFormat::Rgba8Unorm,
    wgpu::TextureFormat::Rgba16Float,
    wgpu::TextureFormat::Rgba16Float,
];
pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;
pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub const LUMINANCE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// A texture and the view passes attach or bind.
pub struct RenderTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl RenderTarget {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
        mip_level_count: u32,
        usage: wgpu::TextureUsages,
    ) -> Self {
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
        // attachments must be single-level views
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            base_mip_level: 0,
            mip_level_count: Some(1),
            ..Default::default()
        });
        Self { texture, view }
    }

    #[must_use]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

pub struct FrameBuffers {
    size: (u32, u32),
    gbuffer: [RenderTarget; 3],
    gbuffer_depth: RenderTarget,
    hdr: RenderTarget,
    hdr_depth: RenderTarget,
    luminance: RenderTarget,
    exposed: RenderTarget,

    gbuffer_layout: wgpu::BindGroupLayout,
    gbuffer_bind_group: wgpu::BindGroup,
    luminance_readback: TextureReadback,
}

impl FrameBuffers {
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = (width.max(1), height.max(1));
        let attachment = wgpu::TextureUsages::RENDER_ATTACHMENT;
        let sampled = attachment | wgpu::TextureUsages::TEXTURE_BINDING;

        let gbuffer = [
            RenderTarget::new(device, "GBuffer Albedo Metallic", size, GBUFFER_FORMATS[0], 1, sampled),
            RenderTarget::new(device, "GBuffer Emissive Depth", size, GBUFFER_FORMATS[1], 1, sampled),
            RenderTarget::new(device, "GBuffer Normal Roughness", size, GBUFFER_FORMATS[2], 1, sampled),
        ];
        let gbuffer_depth = RenderTarget::new(
            device,
            "GBuffer Depth Stencil",
            size,
            DEPTH_STENCIL_FORMAT,
            1,
            attachment | wgpu::TextureUsages::COPY_SRC,
        );
        let hdr = RenderTarget::new(device, "HDR Color", size, HDR_FORMAT, 1, sampled);
        let hdr_depth = RenderTarget::new(
            device,
            "HDR Depth Stencil",
            size,
            DEPTH_STENCIL_FORMAT,
            1,
            attachment | wgpu::TextureUsages::COPY_DST,
        );
        let luminance_mips = full_mip_count(size.0, size.1);
        let luminance = RenderTarget::new(
            device,
            "Log Luminance",
            size,
            LUMINANCE_FORMAT,
            luminance_mips,
            sampled | wgpu::TextureUsages::COPY_SRC,
        );
        let exposed = RenderTarget::new(device, "Exposed Color", size, HDR_FORMAT, 1, sampled);

        let gbuffer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("GBuffer Layout"),
            entries: &[texture_entry(0), texture_entry(1), texture_entry(2)],
        });
        let gbuffer_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("GBuffer BindGroup"),
            layout: &gbuffer_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(gbuffer[0].view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(gbuffer[1].view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(gbuffer[2].view()),
                },
            ],
        });

        log::info!("Created frame buffers {}x{} ({luminance_mips} luminance levels)", size.0, size.1);

        Self {
            size,
            gbuffer,
            gbuffer_depth,
            hdr,
            hdr_depth,
            luminance,
            exposed,
            gbuffer_layout,
            gbuffer_bind_group,
            luminance_readback: TextureReadback::new(device, "Average Luminance Readback", 1, 1, 8),
        }
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    #[must_use]
    pub fn gbuffer(&self) -> &[RenderTarget; 3] {
        &self.gbuffer
    }

    #[must_use]
    pub fn gbuffer_depth(&self) -> &RenderTarget {
        &self.gbuffer_depth
    }

    #[must_use]
    pub fn hdr(&self) -> &RenderTarget {
        &self.hdr
    }

    #[must_use]
    pub fn hdr_depth(&self) -> &RenderTarget {
        &self.hdr_depth
    }

    #[must_use]
    pub fn luminance(&self) -> &RenderTarget {
        &self.luminance
    }

    #[must_use]
    pub fn exposed(&self) -> &RenderTarget {
        &self.exposed
    }

    #[must_use]
    pub fn gbuffer_layout(&self) -> &wgpu::BindGroupLayout {
        &self.gbuffer_layout
    }

    #[must_use]
    pub fn gbuffer_bind_group(&self) -> &wgpu::BindGroup {
        &self.gbuffer_bind_group
    }

    /// Copies the 1x1 top of the luminance chain into the readback buffer.
    pub fn record_luminance_readback(&self, encoder: &mut wgpu::CommandEncoder) {
        let last_level = self.luminance.texture().mip_level_count() - 1;
        self.luminance_readback
            .record_copy(encoder, self.luminance.texture(), last_level, 0);
    }

    /// Geometric mean of the frame's luminance, cd/m².
    ///
    /// Blocks until the GPU finished the submission that recorded
    /// [`record_luminance_readback`](Self::record_luminance_readback).
    pub fn read_average_luminance(&self, device: &wgpu::Device) -> Result<f32> {
        let bytes = self.luminance_readback.read(device)?;
        let [lo, hi] = bytes
            .get(..2)
            .and_then(|b| <[u8; 2]>::try_from(b).ok())
            .ok_or_else(|| UmbraError::Readback("luminance readback is empty".to_string()))?;
        let log_average = f16::from_le_bytes([lo, hi]).to_f32();
        Ok(log_average.exp())
    }
}
