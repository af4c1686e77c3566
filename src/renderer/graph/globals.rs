//! Bindings shared by every pass of a frame.
//!
//! The camera block and the per-entity object table are written once per
//! frame, before any node prepares. Entity `i` of the scene is always entry
//! `i` of the object table. The proxy sphere for light volumes lives here too
//! since both punctual light passes draw it.

use glam::Vec2;

use crate::assets::AssetStore;
use crate::errors::Result;
use crate::renderer::core::{UniformBlock, UniformTable};
use crate::resources::mesh::Mesh;
use crate::resources::primitives::{SphereOptions, create_sphere};
use crate::resources::uniforms::{CameraUniforms, ObjectUniforms};
use crate::scene::{Camera, Scene};

pub struct GlobalBindings {
    camera: UniformBlock<CameraUniforms>,
    objects: UniformTable<ObjectUniforms>,
    object_staging: Vec<ObjectUniforms>,
    light_volume: Mesh,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Result<Self> {
        let camera = UniformBlock::new(
            device,
            "Camera Uniforms",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            &CameraUniforms::new(&Camera::default(), Vec2::ONE),
        );
        let objects = UniformTable::new(device, "Object Uniforms", wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT);
        let light_volume = Mesh::upload(device, "Light Volume Sphere", &create_sphere(&SphereOptions::light_volume()))?;

        Ok(Self {
            camera,
            objects,
            object_staging: Vec::new(),
            light_volume,
        })
    }

    /// Uploads camera and entity data for the coming frame.
    pub fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene, assets: &AssetStore, viewport: Vec2) {
        self.camera.write(queue, &CameraUniforms::new(&scene.camera, viewport));

        self.object_staging.clear();
        self.object_staging.extend(scene.entities.iter().map(|entity| {
            let emissive_intensity = assets
                .material(entity.material)
                .map_or(0.0, |material| material.emissive_intensity());
            ObjectUniforms::new(entity, emissive_intensity)
        }));
        self.objects.write(device, queue, &self.object_staging);
    }

    #[must_use]
    pub fn camera_layout(&self) -> &wgpu::BindGroupLayout {
        self.camera.layout()
    }

    #[must_use]
    pub fn camera_bind_group(&self) -> &wgpu::BindGroup {
        self.camera.bind_group()
    }

    #[must_use]
    pub fn object_layout(&self) -> &wgpu::BindGroupLayout {
        self.objects.layout()
    }

    #[must_use]
    pub fn object_bind_group(&self) -> &wgpu::BindGroup {
        self.objects.bind_group()
    }

    /// Dynamic offset of scene entity `index`.
    #[inline]
    #[must_use]
    pub fn object_offset(&self, index: usize) -> u32 {
        self.objects.offset(index)
    }

    #[must_use]
    pub fn light_volume(&self) -> &Mesh {
        &self.light_volume
    }
}
