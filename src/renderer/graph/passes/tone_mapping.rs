//! ACES filmic tone mapping into the output target.
//!
//! Gamma is applied in the shader only when the output format does not
//! encode sRGB on store.

use crate::errors::Result;
use crate::renderer::core::{UniformBlock, shader};
use crate::renderer::graph::context::ExecuteContext;
use crate::renderer::graph::frame::FrameBuffers;
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::passes::{SampledInput, overwrite};
use crate::renderer::graph::pipeline::{PipelineSpec, create_pipeline};
use crate::renderer::graph::render_state::PassState;
use crate::resources::uniforms::ToneMapUniforms;

pub struct ToneMappingPass {
    pipeline: wgpu::RenderPipeline,
    input: SampledInput,
    uniforms: UniformBlock<ToneMapUniforms>,
}

impl ToneMappingPass {
    pub fn new(device: &wgpu::Device, frame: &FrameBuffers, output_format: wgpu::TextureFormat) -> Result<Self> {
        let module = shader::compile(device, "Tone Mapping Shader", include_str!("../../shaders/tone_mapping.wgsl"))?;
        let input = SampledInput::new(device, "Tone Mapping Input", frame.exposed().view());
        let uniforms = UniformBlock::new(
            device,
            "Tone Mapping Uniforms",
            wgpu::ShaderStages::FRAGMENT,
            &ToneMapUniforms {
                apply_gamma: u32::from(!output_format.is_srgb()),
                _pad: [0; 3],
            },
        );
        let pipeline = create_pipeline(
            device,
            &PipelineSpec::fullscreen(
                "Tone Mapping Pipeline",
                &module,
                &[input.layout(), uniforms.layout()],
                &[output_format],
                PassState::POST,
            ),
        )?;
        log::debug!("Tone mapping into {output_format:?}");
        Ok(Self {
            pipeline,
            input,
            uniforms,
        })
    }
}

impl RenderNode for ToneMappingPass {
    fn name(&self) -> &'static str {
        "Tone Mapping Pass"
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let Some(output) = ctx.output else {
            log::warn!("Tone mapping has no output target");
            return;
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Tone Mapping Pass"),
            color_attachments: &[Some(overwrite(output))],
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
