//! Render passes.
//!
//! Scene graph, in order: geometry, depth transfer, sky, emissive,
//! directional light, specular IBL, point lights, spot lights, log average.
//! Post graph: exposure, tone mapping.

mod depth_transfer;
mod directional_light;
mod emissive;
mod exposure;
mod geometry;
mod light_volume;
mod log_average;
mod point_light;
mod shadow_casters;
mod sky;
mod specular_ibl;
mod spot_light;
mod tone_mapping;

pub use depth_transfer::DepthTransferPass;
pub use directional_light::DirectionalLightPass;
pub use emissive::EmissivePass;
pub use exposure::ExposurePass;
pub use geometry::GeometryPass;
pub use log_average::LogAveragePass;
pub use point_light::PointLightPass;
pub use sky::SkyPass;
pub use specular_ibl::SpecularIblPass;
pub use spot_light::SpotLightPass;
pub use tone_mapping::ToneMappingPass;

use crate::renderer::graph::pipeline::texture_entry;

/// HDR color attachment that keeps what earlier passes accumulated.
pub(crate) fn accumulate(view: &wgpu::TextureView) -> wgpu::RenderPassColorAttachment<'_> {
    wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load: wgpu::LoadOp::Load,
            store: wgpu::StoreOp::Store,
        },
        depth_slice: None,
    }
}

/// Color attachment fully covered by a full-screen draw.
pub(crate) fn overwrite(view: &wgpu::TextureView) -> wgpu::RenderPassColorAttachment<'_> {
    wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            store: wgpu::StoreOp::Store,
        },
        depth_slice: None,
    }
}

/// Read-only depth and stencil, for passes that only test the marker.
pub(crate) fn load_depth_stencil(view: &wgpu::TextureView) -> wgpu::RenderPassDepthStencilAttachment<'_> {
    wgpu::RenderPassDepthStencilAttachment {
        view,
        depth_ops: Some(wgpu::Operations {
            load: wgpu::LoadOp::Load,
            store: wgpu::StoreOp::Store,
        }),
        stencil_ops: Some(wgpu::Operations {
            load: wgpu::LoadOp::Load,
            store: wgpu::StoreOp::Store,
        }),
    }
}

/// A frame buffer bound as the only texture of group 0 of a post pass.
pub(crate) struct SampledInput {
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl SampledInput {
    pub(crate) fn new(device: &wgpu::Device, label: &str, view: &wgpu::TextureView) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[texture_entry(0)],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            }],
        });
        Self { layout, bind_group }
    }

    pub(crate) fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub(crate) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
