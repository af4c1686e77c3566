//! Depth-only shadow caster rendering shared by the three light passes.

use crate::assets::AssetStore;
use crate::errors::Result;
use crate::renderer::core::{UniformTable, shader};
use crate::renderer::graph::frame::SHADOW_FORMAT;
use crate::renderer::graph::globals::GlobalBindings;
use crate::renderer::graph::pipeline::{PipelineSpec, create_pipeline};
use crate::renderer::graph::render_state::PassState;
use crate::resources::mesh::Vertex;
use crate::resources::uniforms::ShadowViewUniforms;
use crate::scene::MeshEntity;

/// What a shadow map stores per texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowDepth {
    /// Hardware depth of a 2D projection (directional and spot lights).
    Projected,
    /// Distance to the light over its range (point light cube faces).
    Distance,
}

pub struct ShadowCasters {
    views: UniformTable<ShadowViewUniforms>,
    pipeline: wgpu::RenderPipeline,
}

impl ShadowCasters {
    pub fn new(device: &wgpu::Device, globals: &GlobalBindings, label: &'static str, depth: ShadowDepth) -> Result<Self> {
        let module = shader::compile(device, label, include_str!("../../shaders/shadow_depth.wgsl"))?;
        let views = UniformTable::new(device, label, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT);

        let (fragment_entry, state) = match depth {
            ShadowDepth::Projected => (None, PassState::SHADOW_DEPTH.with_depth_bias(2, 2.0)),
            ShadowDepth::Distance => (Some("fs_distance"), PassState::SHADOW_DEPTH),
        };
        let pipeline = create_pipeline(
            device,
            &PipelineSpec {
                label,
                module: &module,
                vertex_entry: "vs_main",
                fragment_entry,
                vertex_buffers: &[Vertex::position_layout()],
                bind_group_layouts: &[views.layout(), globals.object_layout()],
                color_formats: &[],
                depth_format: Some(SHADOW_FORMAT),
                state,
            },
        )?;

        Ok(Self { views, pipeline })
    }

    /// Uploads the views of this frame; `render` selects one by index.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, views: &[ShadowViewUniforms]) {
        self.views.write(device, queue, views);
    }

    /// Clears `target` and draws the entities listed in `casters` into it
    /// from shadow view `view_index`.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        view_index: usize,
        globals: &GlobalBindings,
        assets: &AssetStore,
        entities: &[MeshEntity],
        casters: impl IntoIterator<Item = usize>,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Depth Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.views.bind_group(), &[self.views.offset(view_index)]);

        for index in casters {
            let Some(mesh) = entities.get(index).and_then(|entity| assets.mesh(entity.mesh)) else {
                continue;
            };
            pass.set_bind_group(1, globals.object_bind_group(), &[globals.object_offset(index)]);
            mesh.draw(&mut pass);
        }
    }
}

/// Square depth texture sampled with a comparison sampler.
#[must_use]
pub fn create_shadow_texture(device: &wgpu::Device, label: &str, size: u32, layers: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size.max(1),
            height: size.max(1),
            depth_or_array_layers: layers,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: SHADOW_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

#[must_use]
pub fn create_shadow_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
