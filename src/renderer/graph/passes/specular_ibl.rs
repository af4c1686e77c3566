//! Split-sum specular image-based lighting over covered pixels.

use crate::assets::{AssetStore, TextureHandle};
use crate::errors::Result;
use crate::renderer::core::shader;
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::{DEPTH_STENCIL_FORMAT, FrameBuffers};
use crate::renderer::graph::globals::GlobalBindings;
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::passes::{accumulate, load_depth_stencil};
use crate::renderer::graph::pipeline::{PipelineSpec, create_pipeline};
use crate::renderer::graph::render_state::PassState;
use crate::resources::texture::HDR_FORMAT;
use crate::scene::SpecularEnvironment;

pub struct SpecularIblPass {
    pipeline: wgpu::RenderPipeline,
    state: PassState,
    environment_layout: wgpu::BindGroupLayout,
    environment_group: Option<((TextureHandle, TextureHandle), wgpu::BindGroup)>,
}

impl SpecularIblPass {
    pub fn new(device: &wgpu::Device, globals: &GlobalBindings, frame: &FrameBuffers, stencil_marker: u32) -> Result<Self> {
        let module = shader::compile_with(
            device,
            "Specular IBL Shader",
            &[shader::GBUFFER_WGSL],
            include_str!("../../shaders/specular_ibl.wgsl"),
        )?;

        let filterable = |binding, view_dimension| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension,
                multisampled: false,
            },
            count: None,
        };
        let sampler = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let environment_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Specular IBL Environment Layout"),
            entries: &[
                filterable(0, wgpu::TextureViewDimension::Cube),
                filterable(1, wgpu::TextureViewDimension::D2),
                sampler(2),
                sampler(3),
            ],
        });

        let state = PassState::SURFACE_LIGHTING.with_stencil_marker(stencil_marker);
        let pipeline = create_pipeline(
            device,
            &PipelineSpec::fullscreen(
                "Specular IBL Pipeline",
                &module,
                &[globals.camera_layout(), frame.gbuffer_layout(), &environment_layout],
                &[HDR_FORMAT],
                state,
            )
            .with_depth(DEPTH_STENCIL_FORMAT),
        )?;

        Ok(Self {
            pipeline,
            state,
            environment_layout,
            environment_group: None,
        })
    }

    fn create_environment_group(
        &self,
        device: &wgpu::Device,
        assets: &AssetStore,
        environment: SpecularEnvironment,
    ) -> Option<wgpu::BindGroup> {
        let cubemap = assets.texture(environment.cubemap)?;
        let lut = assets.texture(environment.brdf_lut)?;
        Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Specular IBL Environment"),
            layout: &self.environment_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(cubemap.view()?),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(lut.view()?),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(cubemap.sampler()?),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(lut.sampler()?),
                },
            ],
        }))
    }
}

impl RenderNode for SpecularIblPass {
    fn name(&self) -> &'static str {
        "Specular IBL Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let Some(environment) = ctx.scene.specular_environment else {
            return;
        };
        let key = (environment.cubemap, environment.brdf_lut);
        if self.environment_group.as_ref().is_some_and(|(cached, _)| *cached == key) {
            return;
        }
        match self.create_environment_group(ctx.device, ctx.assets, environment) {
            Some(group) => self.environment_group = Some((key, group)),
            None => {
                log::warn!("Specular environment textures are not loaded, skipping image-based lighting");
                self.environment_group = None;
            }
        }
    }

    fn invalidate(&mut self) {
        self.environment_group = None;
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        if ctx.scene.entities.is_empty() {
            return;
        }
        let (Some(environment), Some((key, group))) = (ctx.scene.specular_environment, self.environment_group.as_ref())
        else {
            return;
        };
        if *key != (environment.cubemap, environment.brdf_lut) {
            return;
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Specular IBL Pass"),
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
        pass.set_bind_group(2, group, &[]);
        pass.draw(0..3, 0..1);
    }
}
