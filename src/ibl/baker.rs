//! GPU bakes for split-sum image-based lighting.
//!
//! Both bakes are full-screen fragment passes into 32-bit float targets,
//! read back to the CPU one image at a time. The environment is uploaded
//! unfiltered at full precision; the shader does its own bilinear taps.

use bytemuck::{Pod, Zeroable};

use crate::errors::{Result, UmbraError};
use crate::ibl::equirect::EquirectMap;
use crate::ibl::exr::texels_from_bytes;
use crate::ibl::{LUT_SIZE, ROUGHNESS_LEVELS, face_size};
use crate::renderer::core::UniformTable;
use crate::renderer::core::readback::TextureReadback;
use crate::renderer::core::shader;
use crate::resources::cube::CubeFace;

const BAKE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
const BAKE_BYTES_PER_PIXEL: u32 = 16;

/// `PrefilterParams` in `prefilter.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
struct PrefilterParams {
    face: u32,
    roughness: f32,
    intensity: f32,
    sample_count: u32,
}

/// `LutParams` in `brdf_lut.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
struct LutParams {
    sample_count: u32,
    _pad: [u32; 3],
}

/// One baked image, tightly packed RGBA32F rows.
pub struct BakedImage {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<f32>,
}

impl BakedImage {
    /// RGBA of texel `(x, y)`.
    #[must_use]
    pub fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [self.texels[i], self.texels[i + 1], self.texels[i + 2], self.texels[i + 3]]
    }
}

pub struct IblBaker<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    sample_count: u32,
}

impl<'a> IblBaker<'a> {
    #[must_use]
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue, sample_count: u32) -> Self {
        Self {
            device,
            queue,
            sample_count: sample_count.max(1),
        }
    }

    #[must_use]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    fn create_target(&self, label: &str, size: u32) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: BAKE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn create_pipeline(
        &self,
        label: &str,
        module: &wgpu::ShaderModule,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
    ) -> Result<wgpu::RenderPipeline> {
        let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts,
            immediate_size: 0,
        });
        shader::validated(self.device, label, || {
            self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs_fullscreen"),
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: BAKE_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        })
    }

    /// Draws one full-screen triangle into `target` and reads it back.
    fn render_and_read(
        &self,
        label: &str,
        pipeline: &wgpu::RenderPipeline,
        bind_groups: &[(&wgpu::BindGroup, &[u32])],
        target: &wgpu::Texture,
        view: &wgpu::TextureView,
    ) -> Result<BakedImage> {
        let size = target.width();
        let readback = TextureReadback::new(self.device, label, size, size, BAKE_BYTES_PER_PIXEL);
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(label),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(pipeline);
            for (index, (group, offsets)) in bind_groups.iter().enumerate() {
                pass.set_bind_group(index as u32, *group, offsets);
            }
            pass.draw(0..3, 0..1);
        }
        readback.record_copy(&mut encoder, target, 0, 0);
        self.queue.submit(std::iter::once(encoder.finish()));

        let bytes = readback.read(self.device)?;
        Ok(BakedImage {
            width: size,
            height: size,
            texels: texels_from_bytes(&bytes),
        })
    }

    // ========================================================================
    // BRDF LUT
    // ========================================================================

    /// Integrates the split-sum BRDF over a `LUT_SIZE`² grid:
    /// x is N·V, y is roughness (row 0 is the smoothest), RG hold
    /// `(scale, bias)`.
    pub fn bake_brdf_lut(&self) -> Result<BakedImage> {
        let module = shader::compile_with(
            self.device,
            "BRDF LUT Shader",
            &[shader::SAMPLING_WGSL],
            include_str!("../renderer/shaders/brdf_lut.wgsl"),
        )?;

        let mut params = UniformTable::<LutParams>::new(self.device, "BRDF LUT Params", wgpu::ShaderStages::FRAGMENT);
        params.write(
            self.device,
            self.queue,
            &[LutParams {
                sample_count: self.sample_count,
                _pad: [0; 3],
            }],
        );

        let pipeline = self.create_pipeline("BRDF LUT Pipeline", &module, &[params.layout()])?;
        let (target, view) = self.create_target("BRDF LUT", LUT_SIZE);
        self.render_and_read("BRDF LUT Bake", &pipeline, &[(params.bind_group(), &[0])], &target, &view)
    }

    // ========================================================================
    // Specular prefilter
    // ========================================================================

    /// Prefilters `environment` for every roughness level and cube face,
    /// handing each face to `on_face` as soon as it is read back.
    pub fn bake_specular<F>(&self, environment: &EquirectMap, intensity: f32, mut on_face: F) -> Result<()>
    where
        F: FnMut(usize, CubeFace, &BakedImage) -> Result<()>,
    {
        let limit = self.device.limits().max_texture_dimension_2d;
        if environment.width() > limit || environment.height() > limit {
            return Err(UmbraError::InvalidArgument(format!(
                "environment map is {}x{}, device limit is {limit}",
                environment.width(),
                environment.height()
            )));
        }

        let module = shader::compile_with(
            self.device,
            "Prefilter Shader",
            &[shader::SAMPLING_WGSL],
            include_str!("../renderer/shaders/prefilter.wgsl"),
        )?;

        let environment_layout = self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Prefilter Environment Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });
        let environment_view = self.upload_environment(environment);
        let environment_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Prefilter Environment"),
            layout: &environment_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&environment_view),
            }],
        });

        let mut params = UniformTable::<PrefilterParams>::new(self.device, "Prefilter Params", wgpu::ShaderStages::FRAGMENT);
        let entries: Vec<PrefilterParams> = ROUGHNESS_LEVELS
            .iter()
            .flat_map(|&(roughness, _)| {
                CubeFace::ALL.map(|face| PrefilterParams {
                    face: face.layer(),
                    roughness,
                    intensity,
                    sample_count: self.sample_count,
                })
            })
            .collect();
        params.write(self.device, self.queue, &entries);

        let pipeline = self.create_pipeline("Prefilter Pipeline", &module, &[params.layout(), &environment_layout])?;

        for level in 0..ROUGHNESS_LEVELS.len() {
            let (target, view) = self.create_target("Prefilter Face", face_size(level));
            for face in CubeFace::ALL {
                let offset = params.offset(level * CubeFace::ALL.len() + face.layer() as usize);
                let image = self.render_and_read(
                    "Prefilter Face Bake",
                    &pipeline,
                    &[(params.bind_group(), &[offset]), (&environment_group, &[])],
                    &target,
                    &view,
                )?;
                on_face(level, face, &image)?;
            }
        }
        Ok(())
    }

    fn upload_environment(&self, environment: &EquirectMap) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: environment.width(),
            height: environment.height(),
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Prefilter Environment"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: BAKE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(environment.texels()),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(environment.width() * BAKE_BYTES_PER_PIXEL),
                rows_per_image: Some(environment.height()),
            },
            size,
        );
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }
}
