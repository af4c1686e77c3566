//! Directional light: orthographic shadow map fitted to the scene, then one
//! full-screen accumulation over covered pixels.

use crate::errors::Result;
use crate::renderer::core::{UniformTable, shader};
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::{DEPTH_STENCIL_FORMAT, FrameBuffers};
use crate::renderer::graph::globals::GlobalBindings;
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::passes::shadow_casters::{
    ShadowCasters, ShadowDepth, create_shadow_bind_group, create_shadow_texture,
};
use crate::renderer::graph::passes::{accumulate, load_depth_stencil};
use crate::renderer::graph::pipeline::{PipelineSpec, create_pipeline, shadow_layout, shadow_sampler};
use crate::renderer::graph::render_state::PassState;
use crate::resources::texture::HDR_FORMAT;
use crate::resources::uniforms::{DirectionalLightUniforms, ShadowViewUniforms};

pub struct DirectionalLightPass {
    pipeline: wgpu::RenderPipeline,
    state: PassState,
    light: UniformTable<DirectionalLightUniforms>,
    casters: ShadowCasters,
    shadow_view: wgpu::TextureView,
    shadow_group: wgpu::BindGroup,
    /// Set in prepare: a light exists and there is geometry to cast shadows.
    shadow_active: bool,
}

impl DirectionalLightPass {
    pub fn new(
        device: &wgpu::Device,
        globals: &GlobalBindings,
        frame: &FrameBuffers,
        shadow_size: u32,
        stencil_marker: u32,
    ) -> Result<Self> {
        let module = shader::compile_with(
            device,
            "Directional Light Shader",
            &[shader::GBUFFER_WGSL],
            include_str!("../../shaders/directional_light.wgsl"),
        )?;
        let light = UniformTable::new(device, "Directional Light Uniforms", wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT);
        let casters = ShadowCasters::new(device, globals, "Directional Shadow", ShadowDepth::Projected)?;

        let shadow_texture = create_shadow_texture(device, "Directional Shadow Map", shadow_size, 1);
        let shadow_view = shadow_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let layout = shadow_layout(device, "Directional Shadow Layout", wgpu::TextureViewDimension::D2);
        let sampler = shadow_sampler(device, "Directional Shadow Sampler");
        let shadow_group = create_shadow_bind_group(device, "Directional Shadow BindGroup", &layout, &shadow_view, &sampler);

        let state = PassState::SURFACE_LIGHTING.with_stencil_marker(stencil_marker);
        let pipeline = create_pipeline(
            device,
            &PipelineSpec::fullscreen(
                "Directional Light Pipeline",
                &module,
                &[globals.camera_layout(), frame.gbuffer_layout(), light.layout(), &layout],
                &[HDR_FORMAT],
                state,
            )
            .with_depth(DEPTH_STENCIL_FORMAT),
        )?;

        Ok(Self {
            pipeline,
            state,
            light,
            casters,
            shadow_view,
            shadow_group,
            shadow_active: false,
        })
    }
}

impl RenderNode for DirectionalLightPass {
    fn name(&self) -> &'static str {
        "Directional Light Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        self.shadow_active = false;
        let Some(light) = ctx.scene.directional_light else {
            return;
        };

        let shadow_view_projection = match ctx.scene.directional_shadow_volume() {
            Some(volume) => Some(volume.view_projection()),
            None => {
                log::debug!("No shadow casters, directional light is unshadowed");
                None
            }
        };
        if let Some(view_projection) = shadow_view_projection {
            self.casters.write(
                ctx.device,
                ctx.queue,
                &[ShadowViewUniforms {
                    view_projection,
                    ..Default::default()
                }],
            );
            self.shadow_active = true;
        }
        self.light.write(
            ctx.device,
            ctx.queue,
            &[DirectionalLightUniforms::new(&light, shadow_view_projection)],
        );
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        if ctx.scene.directional_light.is_none() || ctx.scene.entities.is_empty() {
            return;
        }

        if self.shadow_active {
            self.casters.render(
                encoder,
                &self.shadow_view,
                0,
                ctx.globals,
                ctx.assets,
                &ctx.scene.entities,
                0..ctx.scene.entities.len(),
            );
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Directional Light Pass"),
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
        pass.set_bind_group(2, self.light.bind_group(), &[self.light.offset(0)]);
        pass.set_bind_group(3, &self.shadow_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
