//! Spot lights: perspective shadow map, then a stencil-culled proxy sphere
//! per light. The cone itself is applied in the shading shader.

use crate::errors::Result;
use crate::renderer::core::UniformTable;
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::FrameBuffers;
use crate::renderer::graph::globals::GlobalBindings;
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::passes::light_volume::LightVolumePipelines;
use crate::renderer::graph::passes::shadow_casters::{
    ShadowCasters, ShadowDepth, create_shadow_bind_group, create_shadow_texture,
};
use crate::renderer::graph::pipeline::{shadow_layout, shadow_sampler};
use crate::renderer::graph::shadow_utils::{CasterList, casters_in_range};
use crate::resources::uniforms::{ShadowViewUniforms, SpotLightUniforms};

pub struct SpotLightPass {
    volumes: LightVolumePipelines,
    lights: UniformTable<SpotLightUniforms>,
    casters: ShadowCasters,
    shadow_view: wgpu::TextureView,
    shadow_group: wgpu::BindGroup,
    caster_lists: Vec<CasterList>,
    view_staging: Vec<ShadowViewUniforms>,
    light_staging: Vec<SpotLightUniforms>,
}

impl SpotLightPass {
    pub fn new(device: &wgpu::Device, globals: &GlobalBindings, frame: &FrameBuffers, shadow_size: u32) -> Result<Self> {
        let lights = UniformTable::new(device, "Spot Light Uniforms", wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT);
        let casters = ShadowCasters::new(device, globals, "Spot Shadow", ShadowDepth::Projected)?;

        let shadow_texture = create_shadow_texture(device, "Spot Shadow Map", shadow_size, 1);
        let shadow_view = shadow_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let layout = shadow_layout(device, "Spot Shadow Layout", wgpu::TextureViewDimension::D2);
        let sampler = shadow_sampler(device, "Spot Shadow Sampler");
        let shadow_group = create_shadow_bind_group(device, "Spot Shadow BindGroup", &layout, &shadow_view, &sampler);

        let volumes = LightVolumePipelines::new(
            device,
            "Spot Light Volume",
            globals,
            frame,
            include_str!("../../shaders/spot_light.wgsl"),
            lights.layout(),
            &layout,
        )?;

        Ok(Self {
            volumes,
            lights,
            casters,
            shadow_view,
            shadow_group,
            caster_lists: Vec::new(),
            view_staging: Vec::new(),
            light_staging: Vec::new(),
        })
    }
}

impl RenderNode for SpotLightPass {
    fn name(&self) -> &'static str {
        "Spot Light Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let lights = &ctx.scene.spot_lights;
        if lights.is_empty() {
            return;
        }

        self.light_staging.clear();
        self.light_staging.extend(lights.iter().map(SpotLightUniforms::new));
        self.lights.write(ctx.device, ctx.queue, &self.light_staging);

        self.view_staging.clear();
        self.view_staging.extend(lights.iter().map(|light| ShadowViewUniforms {
            view_projection: light.view_projection(),
            light_position: light.position,
            range: light.range,
        }));
        self.casters.write(ctx.device, ctx.queue, &self.view_staging);

        self.caster_lists.clear();
        self.caster_lists.extend(
            lights
                .iter()
                .map(|light| casters_in_range(&ctx.scene.entities, light.position, light.range)),
        );
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        if ctx.scene.entities.is_empty() {
            return;
        }
        for (index, caster_list) in self.caster_lists.iter().enumerate().take(ctx.scene.spot_lights.len()) {
            self.casters.render(
                encoder,
                &self.shadow_view,
                index,
                ctx.globals,
                ctx.assets,
                &ctx.scene.entities,
                caster_list.iter().copied(),
            );
            self.volumes
                .draw(ctx, encoder, self.lights.bind_group(), self.lights.offset(index), &self.shadow_group);
        }
    }
}
