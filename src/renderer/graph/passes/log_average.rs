//! Log-average scene luminance.
//!
//! Writes `ln(L + ε)` per pixel, box-filters the mip chain down to 1x1 and
//! copies that texel to the readback buffer. The renderer reads it after the
//! scene graph is submitted to drive the exposure model.

use crate::errors::Result;
use crate::renderer::core::shader;
use crate::renderer::graph::context::ExecuteContext;
use crate::renderer::graph::frame::{FrameBuffers, LUMINANCE_FORMAT};
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::passes::{SampledInput, overwrite};
use crate::renderer::graph::pipeline::{PipelineSpec, create_pipeline};
use crate::renderer::graph::render_state::PassState;

pub struct LogAveragePass {
    pipeline: wgpu::RenderPipeline,
    input: SampledInput,
}

impl LogAveragePass {
    pub fn new(device: &wgpu::Device, frame: &FrameBuffers) -> Result<Self> {
        let module = shader::compile(device, "Log Luminance Shader", include_str!("../../shaders/log_luminance.wgsl"))?;
        let input = SampledInput::new(device, "Log Luminance Input", frame.hdr().view());
        let pipeline = create_pipeline(
            device,
            &PipelineSpec::fullscreen(
                "Log Luminance Pipeline",
                &module,
                &[input.layout()],
                &[LUMINANCE_FORMAT],
                PassState::POST,
            ),
        )?;
        Ok(Self { pipeline, input })
    }
}

impl RenderNode for LogAveragePass {
    fn name(&self) -> &'static str {
        "Log Average Pass"
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Log Luminance Pass"),
                color_attachments: &[Some(overwrite(ctx.frame.luminance().view()))],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, self.input.bind_group(), &[]);
            pass.draw(0..3, 0..1);
        }
        ctx.assets
            .mipmaps()
            .generate(ctx.device, encoder, ctx.frame.luminance().texture());
        ctx.frame.record_luminance_readback(encoder);
    }
}
