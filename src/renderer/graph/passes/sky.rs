//! Clears the HDR buffer and fills uncovered pixels with the sky.

use crate::assets::TextureHandle;
use crate::errors::Result;
use crate::renderer::core::{UniformBlock, shader};
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::DEPTH_STENCIL_FORMAT;
use crate::renderer::graph::globals::GlobalBindings;
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::pipeline::{PipelineSpec, create_pipeline};
use crate::renderer::graph::render_state::PassState;
use crate::renderer::graph::passes::load_depth_stencil;
use crate::resources::texture::HDR_FORMAT;
use crate::resources::uniforms::SkyUniforms;

pub struct SkyPass {
    pipeline: wgpu::RenderPipeline,
    state: PassState,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniforms: UniformBlock<SkyUniforms>,
    /// Bind group of the sky currently drawn, rebuilt when the texture changes.
    texture_group: Option<(TextureHandle, wgpu::BindGroup)>,
}

impl SkyPass {
    pub fn new(device: &wgpu::Device, globals: &GlobalBindings, stencil_marker: u32) -> Result<Self> {
        let module = shader::compile(device, "Sky Shader", include_str!("../../shaders/sky.wgsl"))?;

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sky Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sky Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let uniforms = UniformBlock::new(device, "Sky Uniforms", wgpu::ShaderStages::FRAGMENT, &SkyUniforms::default());

        let state = PassState::SKY.with_stencil_marker(stencil_marker);
        let pipeline = create_pipeline(
            device,
            &PipelineSpec::fullscreen(
                "Sky Pipeline",
                &module,
                &[globals.camera_layout(), &texture_layout, uniforms.layout()],
                &[HDR_FORMAT],
                state,
            )
            .with_depth(DEPTH_STENCIL_FORMAT),
        )?;

        Ok(Self {
            pipeline,
            state,
            texture_layout,
            sampler,
            uniforms,
            texture_group: None,
        })
    }
}

impl RenderNode for SkyPass {
    fn name(&self) -> &'static str {
        "Sky Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let Some(sky) = ctx.scene.sky else {
            return;
        };
        self.uniforms.write(
            ctx.queue,
            &SkyUniforms {
                intensity: sky.intensity,
                _pad: [0.0; 3],
            },
        );
        if self.texture_group.as_ref().is_some_and(|(handle, _)| *handle == sky.texture) {
            return;
        }
        let Some(view) = ctx.assets.texture_view_or_white(sky.texture) else {
            return;
        };
        let group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sky BindGroup"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.texture_group = Some((sky.texture, group));
    }

    fn invalidate(&mut self) {
        self.texture_group = None;
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Sky Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.frame.hdr().view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(load_depth_stencil(ctx.frame.hdr_depth().view())),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let (Some(_), Some((_, texture_group))) = (ctx.scene.sky, self.texture_group.as_ref()) else {
            return;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_stencil_reference(self.state.stencil_reference);
        pass.set_bind_group(0, ctx.globals.camera_bind_group(), &[]);
        pass.set_bind_group(1, texture_group, &[]);
        pass.set_bind_group(2, self.uniforms.bind_group(), &[]);
        pass.draw(0..3, 0..1);
    }
}
