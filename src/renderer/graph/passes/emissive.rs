use crate::errors::Result;
use crate::renderer::core::shader;
use crate::renderer::graph::context::ExecuteContext;
use crate::renderer::graph::frame::{DEPTH_STENCIL_FORMAT, FrameBuffers};
use crate::renderer::graph::globals::GlobalBindings;
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::passes::{accumulate, load_depth_stencil};
use crate::renderer::graph::pipeline::{PipelineSpec, create_pipeline};
use crate::renderer::graph::render_state::PassState;
use crate::resources::texture::HDR_FORMAT;

/// Adds the emissive G-buffer channel to the HDR buffer over covered pixels.
pub struct EmissivePass {
    pipeline: wgpu::RenderPipeline,
    state: PassState,
}

impl EmissivePass {
    pub fn new(device: &wgpu::Device, globals: &GlobalBindings, frame: &FrameBuffers, stencil_marker: u32) -> Result<Self> {
        let module = shader::compile_with(
            device,
            "Emissive Shader",
            &[shader::GBUFFER_WGSL],
            include_str!("../../shaders/emissive.wgsl"),
        )?;
        let state = PassState::SURFACE_LIGHTING.with_stencil_marker(stencil_marker);
        let pipeline = create_pipeline(
            device,
            &PipelineSpec::fullscreen(
                "Emissive Pipeline",
                &module,
                &[globals.camera_layout(), frame.gbuffer_layout()],
                &[HDR_FORMAT],
                state,
            )
            .with_depth(DEPTH_STENCIL_FORMAT),
        )?;
        Ok(Self { pipeline, state })
    }
}

impl RenderNode for EmissivePass {
    fn name(&self) -> &'static str {
        "Emissive Pass"
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        if ctx.scene.entities.is_empty() {
            return;
        }
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Emissive Pass"),
            color_attachments: &[Some(accumulate(ctx.frame.hdr().view()))],
            depth_stencil_attachment: Some(load_depth_stencil(ctx.frame.hdr_depth().view())),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_stencil_reference(self.state.stencil_reference);
        pass.set_bind_group(0, ctx.globals.camera_bind_group(), &[]);
        pass.set_bind_group(1, ctx.frame.gbuffer_bind_group(), &[]);
        pass.draw(0..3, 0..1);
    }
}
