//! G-buffer fill.
//!
//! One draw per mesh entity. Covered pixels get the stencil marker that the
//! sky and full-screen lighting passes test against.

use rustc_hash::FxHashMap;

use crate::assets::{AssetStore, MaterialHandle};
use crate::errors::Result;
use crate::renderer::core::shader;
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::{DEPTH_STENCIL_FORMAT, GBUFFER_FORMATS};
use crate::renderer::graph::globals::GlobalBindings;
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::pipeline::{PipelineSpec, create_pipeline};
use crate::renderer::graph::render_state::PassState;
use crate::resources::material::{Material, MaterialSlots};
use crate::resources::mesh::Vertex;

const MATERIAL_TEXTURE_COUNT: u32 = 5;

pub struct GeometryPass {
    pipeline: wgpu::RenderPipeline,
    state: PassState,
    material_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    material_groups: FxHashMap<MaterialHandle, wgpu::BindGroup>,
}

impl GeometryPass {
    pub fn new(device: &wgpu::Device, globals: &GlobalBindings, stencil_marker: u32) -> Result<Self> {
        let module = shader::compile(device, "Geometry Shader", include_str!("../../shaders/geometry.wgsl"))?;

        let mut entries: Vec<wgpu::BindGroupLayoutEntry> = (0..MATERIAL_TEXTURE_COUNT)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            })
            .collect();
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: MATERIAL_TEXTURE_COUNT,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Layout"),
            entries: &entries,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let state = PassState::GEOMETRY.with_stencil_marker(stencil_marker);
        let pipeline = create_pipeline(
            device,
            &PipelineSpec {
                label: "Geometry Pipeline",
                module: &module,
                vertex_entry: "vs_main",
                fragment_entry: Some("fs_main"),
                vertex_buffers: &[Vertex::layout()],
                bind_group_layouts: &[globals.camera_layout(), globals.object_layout(), &material_layout],
                color_formats: &GBUFFER_FORMATS,
                depth_format: Some(DEPTH_STENCIL_FORMAT),
                state,
            },
        )?;

        Ok(Self {
            pipeline,
            state,
            material_layout,
            sampler,
            material_groups: FxHashMap::default(),
        })
    }

    fn create_material_group(&self, device: &wgpu::Device, assets: &AssetStore, slots: &MaterialSlots) -> Option<wgpu::BindGroup> {
        let views = slots
            .as_array()
            .map(|handle| assets.texture_view_or_white(handle));
        let mut entries = Vec::with_capacity(views.len() + 1);
        for (binding, view) in views.into_iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(view?),
            });
        }
        entries.push(wgpu::BindGroupEntry {
            binding: MATERIAL_TEXTURE_COUNT,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        });
        Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material BindGroup"),
            layout: &self.material_layout,
            entries: &entries,
        }))
    }
}

impl RenderNode for GeometryPass {
    fn name(&self) -> &'static str {
        "Geometry Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        for entity in &ctx.scene.entities {
            if self.material_groups.contains_key(&entity.material) {
                continue;
            }
            let defaults = ctx.assets.defaults();
            let slots = ctx.assets.material(entity.material).map_or_else(
                || {
                    log::warn!("Entity references a missing material, drawing it white");
                    Material::Albedo { albedo: defaults.white }.slots(defaults)
                },
                |material| material.slots(defaults),
            );
            match self.create_material_group(ctx.device, ctx.assets, &slots) {
                Some(group) => {
                    self.material_groups.insert(entity.material, group);
                }
                None => log::error!("Default textures are missing, material cannot be bound"),
            }
        }
    }

    fn invalidate(&mut self) {
        self.material_groups.clear();
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let gbuffer = ctx.frame.gbuffer();
        let clear = wgpu::Operations {
            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            store: wgpu::StoreOp::Store,
        };
        let color_attachments = gbuffer.each_ref().map(|target| {
            Some(wgpu::RenderPassColorAttachment {
                view: target.view(),
                resolve_target: None,
                ops: clear,
                depth_slice: None,
            })
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Geometry Pass"),
            color_attachments: &color_attachments,
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: ctx.frame.gbuffer_depth().view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
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

        pass.set_pipeline(&self.pipeline);
        pass.set_stencil_reference(self.state.stencil_reference);
        pass.set_bind_group(0, ctx.globals.camera_bind_group(), &[]);

        for (index, entity) in ctx.scene.entities.iter().enumerate() {
            let (Some(mesh), Some(material_group)) = (
                ctx.assets.mesh(entity.mesh),
                self.material_groups.get(&entity.material),
            ) else {
                continue;
            };
            pass.set_bind_group(1, ctx.globals.object_bind_group(), &[ctx.globals.object_offset(index)]);
            pass.set_bind_group(2, material_group, &[]);
            mesh.draw(&mut pass);
        }
    }
}
