//! Stencil-culled light volumes shared by the point and spot light passes.
//!
//! Each light is drawn in its own render pass over the HDR target:
//!
//! 1. clear stencil to 0, keep depth and color
//! 2. draw the proxy sphere with [`PassState::LIGHT_VOLUME_STENCIL`]: back
//!    faces behind the surface increment, front faces behind it decrement
//! 3. draw the sphere again with [`PassState::LIGHT_VOLUME_SHADING`]; only
//!    pixels with a non-zero count are shaded
//!
//! Clearing the stencil erases the geometry marker, so these passes run after
//! every full-screen lighting pass.

use crate::errors::Result;
use crate::renderer::core::shader;
use crate::renderer::graph::context::ExecuteContext;
use crate::renderer::graph::frame::{DEPTH_STENCIL_FORMAT, FrameBuffers};
use crate::renderer::graph::globals::GlobalBindings;
use crate::renderer::graph::passes::accumulate;
use crate::renderer::graph::pipeline::{PipelineSpec, create_pipeline};
use crate::renderer::graph::render_state::PassState;
use crate::resources::mesh::Vertex;
use crate::resources::texture::HDR_FORMAT;

pub struct LightVolumePipelines {
    label: &'static str,
    stencil: wgpu::RenderPipeline,
    shading: wgpu::RenderPipeline,
}

impl LightVolumePipelines {
    /// `shading_source` provides `vs_volume` and `fs_main` and binds the
    /// light at group 2 and its shadow at group 3.
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        globals: &GlobalBindings,
        frame: &FrameBuffers,
        shading_source: &str,
        light_layout: &wgpu::BindGroupLayout,
        shadow_layout: &wgpu::BindGroupLayout,
    ) -> Result<Self> {
        let stencil_module = shader::compile(device, "Light Volume Stencil Shader", include_str!("../../shaders/light_volume.wgsl"))?;
        let shading_module = shader::compile_with(device, label, &[shader::GBUFFER_WGSL], shading_source)?;
        let vertex_buffers = [Vertex::position_layout()];

        let stencil = create_pipeline(
            device,
            &PipelineSpec {
                label: "Light Volume Stencil Pipeline",
                module: &stencil_module,
                vertex_entry: "vs_main",
                fragment_entry: Some("fs_stencil"),
                vertex_buffers: &vertex_buffers,
                bind_group_layouts: &[globals.camera_layout(), light_layout],
                color_formats: &[HDR_FORMAT],
                depth_format: Some(DEPTH_STENCIL_FORMAT),
                state: PassState::LIGHT_VOLUME_STENCIL,
            },
        )?;
        let shading = create_pipeline(
            device,
            &PipelineSpec {
                label,
                module: &shading_module,
                vertex_entry: "vs_volume",
                fragment_entry: Some("fs_main"),
                vertex_buffers: &vertex_buffers,
                bind_group_layouts: &[globals.camera_layout(), frame.gbuffer_layout(), light_layout, shadow_layout],
                color_formats: &[HDR_FORMAT],
                depth_format: Some(DEPTH_STENCIL_FORMAT),
                state: PassState::LIGHT_VOLUME_SHADING,
            },
        )?;

        Ok(Self { label, stencil, shading })
    }

    /// Marks and shades the volume of one light.
    pub fn draw(
        &self,
        ctx: &ExecuteContext,
        encoder: &mut wgpu::CommandEncoder,
        light_group: &wgpu::BindGroup,
        light_offset: u32,
        shadow_group: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.label),
            color_attachments: &[Some(accumulate(ctx.frame.hdr().view()))],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: ctx.frame.hdr_depth().view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        let volume = ctx.globals.light_volume();

        pass.set_pipeline(&self.stencil);
        pass.set_stencil_reference(PassState::LIGHT_VOLUME_STENCIL.stencil_reference);
        pass.set_bind_group(0, ctx.globals.camera_bind_group(), &[]);
        pass.set_bind_group(1, light_group, &[light_offset]);
        volume.draw(&mut pass);

        pass.set_pipeline(&self.shading);
        pass.set_stencil_reference(PassState::LIGHT_VOLUME_SHADING.stencil_reference);
        pass.set_bind_group(0, ctx.globals.camera_bind_group(), &[]);
        pass.set_bind_group(1, ctx.frame.gbuffer_bind_group(), &[]);
        pass.set_bind_group(2, light_group, &[light_offset]);
        pass.set_bind_group(3, shadow_group, &[]);
        volume.draw(&mut pass);
    }
}
