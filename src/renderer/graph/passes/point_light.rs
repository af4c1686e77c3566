//! Point lights: six-face distance cube shadow, then a stencil-culled proxy
//! sphere per light.

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
use crate::resources::cube::CubeFace;
use crate::resources::uniforms::{PointLightUniforms, ShadowViewUniforms};

const FACE_COUNT: usize = CubeFace::ALL.len();

pub struct PointLightPass {
    volumes: LightVolumePipelines,
    lights: UniformTable<PointLightUniforms>,
    casters: ShadowCasters,
    /// One single-layer view per cube face, in layer order.
    face_views: [wgpu::TextureView; FACE_COUNT],
    shadow_group: wgpu::BindGroup,
    /// Shadow casters of each light, refreshed in prepare.
    caster_lists: Vec<CasterList>,
    view_staging: Vec<ShadowViewUniforms>,
    light_staging: Vec<PointLightUniforms>,
}

impl PointLightPass {
    pub fn new(device: &wgpu::Device, globals: &GlobalBindings, frame: &FrameBuffers, shadow_size: u32) -> Result<Self> {
        let lights = UniformTable::new(device, "Point Light Uniforms", wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT);
        let casters = ShadowCasters::new(device, globals, "Point Shadow", ShadowDepth::Distance)?;

        // shared by every light; each light re-renders it before shading
        let shadow_texture = create_shadow_texture(device, "Point Shadow Cube", shadow_size, FACE_COUNT as u32);
        let face_views = CubeFace::ALL.map(|face| {
            shadow_texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("Point Shadow Face"),
                dimension: Some(wgpu::TextureViewDimension::D2),
                base_array_layer: face.layer(),
                array_layer_count: Some(1),
                ..Default::default()
            })
        });
        let cube_view = shadow_texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Point Shadow Cube View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            array_layer_count: Some(FACE_COUNT as u32),
            ..Default::default()
        });
        let layout = shadow_layout(device, "Point Shadow Layout", wgpu::TextureViewDimension::Cube);
        let sampler = shadow_sampler(device, "Point Shadow Sampler");
        let shadow_group = create_shadow_bind_group(device, "Point Shadow BindGroup", &layout, &cube_view, &sampler);

        let volumes = LightVolumePipelines::new(
            device,
            "Point Light Volume",
            globals,
            frame,
            include_str!("../../shaders/point_light.wgsl"),
            lights.layout(),
            &layout,
        )?;

        Ok(Self {
            volumes,
            lights,
            casters,
            face_views,
            shadow_group,
            caster_lists: Vec::new(),
            view_staging: Vec::new(),
            light_staging: Vec::new(),
        })
    }
}

impl RenderNode for PointLightPass {
    fn name(&self) -> &'static str {
        "Point Light Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let lights = &ctx.scene.point_lights;
        if lights.is_empty() {
            return;
        }

        self.light_staging.clear();
        self.light_staging.extend(lights.iter().map(PointLightUniforms::new));
        self.lights.write(ctx.device, ctx.queue, &self.light_staging);

        self.view_staging.clear();
        self.caster_lists.clear();
        for light in lights {
            self.view_staging
                .extend(light.face_view_projections().map(|view_projection| ShadowViewUniforms {
                    view_projection,
                    light_position: light.position,
                    range: light.range,
                }));
            self.caster_lists.push(if light.use_shadow {
                casters_in_range(&ctx.scene.entities, light.position, light.range)
            } else {
                CasterList::new()
            });
        }
        self.casters.write(ctx.device, ctx.queue, &self.view_staging);
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        if ctx.scene.entities.is_empty() {
            return;
        }
        for (index, light) in ctx.scene.point_lights.iter().enumerate() {
            let Some(caster_list) = self.caster_lists.get(index) else {
                break;
            };
            if light.use_shadow {
                for face in CubeFace::ALL {
                    let layer = face.layer() as usize;
                    self.casters.render(
                        encoder,
                        &self.face_views[layer],
                        index * FACE_COUNT + layer,
                        ctx.globals,
                        ctx.assets,
                        &ctx.scene.entities,
                        caster_list.iter().copied(),
                    );
                }
            }
            self.volumes
                .draw(ctx, encoder, self.lights.bind_group(), self.lights.offset(index), &self.shadow_group);
        }
    }
}
