//! Scales the HDR buffer by the exposure solved from last readback.

use crate::errors::Result;
use crate::renderer::core::{UniformBlock, shader};
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::FrameBuffers;
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::passes::{SampledInput, overwrite};
use crate::renderer::graph::pipeline::{PipelineSpec, create_pipeline};
use crate::renderer::graph::render_state::PassState;
use crate::resources::texture::HDR_FORMAT;
use crate::resources::uniforms::ExposureUniforms;

pub struct ExposurePass {
    pipeline: wgpu::RenderPipeline,
    input: SampledInput,
    uniforms: UniformBlock<ExposureUniforms>,
}

impl ExposurePass {
    pub fn new(device: &wgpu::Device, frame: &FrameBuffers) -> Result<Self> {
        let module = shader::compile(device, "Exposure Shader", include_str!("../../shaders/exposure.wgsl"))?;
        let input = SampledInput::new(device, "Exposure Input", frame.hdr().view());
        let uniforms = UniformBlock::new(
            device,
            "Exposure Uniforms",
            wgpu::ShaderStages::FRAGMENT,
            &ExposureUniforms {
                exposure: 1.0,
                _pad: [0.0; 3],
            },
        );
        let pipeline = create_pipeline(
            device,
            &PipelineSpec::fullscreen(
                "Exposure Pipeline",
                &module,
                &[input.layout(), uniforms.layout()],
                &[HDR_FORMAT],
                PassState::POST,
            ),
        )?;
        Ok(Self {
            pipeline,
            input,
            uniforms,
        })
    }
}

impl RenderNode for ExposurePass {
    fn name(&self) -> &'static str {
        "Exposure Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        self.uniforms.write(
            ctx.queue,
            &ExposureUniforms {
                exposure: ctx.exposure,
                _pad: [0.0; 3],
            },
        );
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Exposure Pass"),
            color_attachments: &[Some(overwrite(ctx.frame.exposed().view()))],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.input.bind_group(), &[]);
        pass.set_bind_group(1, self.uniforms.bind_group(), &[]);
        pass.draw(0..3, 0..1);
    }
}
