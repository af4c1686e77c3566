//! Render pipeline construction from a [`PassState`].

use crate::errors::Result;
use crate::renderer::core::shader;
use crate::renderer::graph::render_state::PassState;

/// Everything that varies between the renderer's pipelines.
pub struct PipelineSpec<'a> {
    pub label: &'a str,
    pub module: &'a wgpu::ShaderModule,
    pub vertex_entry: &'a str,
    /// `None` for depth-only draws.
    pub fragment_entry: Option<&'a str>,
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub color_formats: &'a [wgpu::TextureFormat],
    pub depth_format: Option<wgpu::TextureFormat>,
    pub state: PassState,
}

impl<'a> PipelineSpec<'a> {
    /// Full-screen triangle drawn by `vs_fullscreen`.
    #[must_use]
    pub fn fullscreen(
        label: &'a str,
        module: &'a wgpu::ShaderModule,
        bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
        color_formats: &'a [wgpu::TextureFormat],
        state: PassState,
    ) -> Self {
        Self {
            label,
            module,
            vertex_entry: "vs_fullscreen",
            fragment_entry: Some("fs_main"),
            vertex_buffers: &[],
            bind_group_layouts,
            color_formats,
            depth_format: None,
            state,
        }
    }

    #[must_use]
    pub fn with_depth(mut self, format: wgpu::TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }
}

pub fn create_pipeline(device: &wgpu::Device, spec: &PipelineSpec) -> Result<wgpu::RenderPipeline> {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(spec.label),
        bind_group_layouts: spec.bind_group_layouts,
        immediate_size: 0,
    });
    let targets: Vec<Option<wgpu::ColorTargetState>> = spec
        .color_formats
        .iter()
        .map(|&format| spec.state.color_target(format))
        .collect();

    shader::validated(device, spec.label, || {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(spec.label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: spec.module,
                entry_point: Some(spec.vertex_entry),
                buffers: spec.vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: spec.fragment_entry.map(|entry| wgpu::FragmentState {
                module: spec.module,
                entry_point: Some(entry),
                targets: &targets,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: spec.state.primitive(),
            depth_stencil: spec.depth_format.map(|format| spec.state.depth_stencil(format)),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    })
}

/// Comparison sampler for single-tap hardware shadow tests.
#[must_use]
pub fn shadow_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        compare: Some(wgpu::CompareFunction::LessEqual),
        ..Default::default()
    })
}

/// Layout of a depth shadow map and its comparison sampler.
#[must_use]
pub fn shadow_layout(device: &wgpu::Device, label: &str, dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Depth,
                    view_dimension: dimension,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
    })
}

/// Layout entry of an unfilterable 2D float texture read with `textureLoad`.
#[must_use]
pub fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}
