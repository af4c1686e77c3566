use glam::{Vec2, Vec3};

use crate::assets::TextureHandle;
use crate::renderer::graph::shadow_utils::{self, DirectionalShadowVolume};
use crate::resources::bounds::BoundingBox;
use crate::scene::camera::Camera;
use crate::scene::entity::MeshEntity;
use crate::scene::light::{DirectionalLight, PointLight, SpotLight};

/// Equirectangular sky radiance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sky {
    pub texture: TextureHandle,
    pub intensity: f32,
}

/// Prefiltered specular environment and its BRDF lookup table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecularEnvironment {
    /// Cube texture with one roughness level per mip.
    pub cubemap: TextureHandle,
    pub brdf_lut: TextureHandle,
}

/// Everything the renderer draws in one frame.
///
/// Topology is fixed while rendering; transforms and light parameters may be
/// changed between frames through the public fields.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub entities: Vec<MeshEntity>,
    pub directional_light: Option<DirectionalLight>,
    pub point_lights: Vec<PointLight>,
    pub spot_lights: Vec<SpotLight>,
    pub sky: Option<Sky>,
    pub specular_environment: Option<SpecularEnvironment>,
}

impl Scene {
    #[must_use]
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            entities: Vec::new(),
            directional_light: None,
            point_lights: Vec::new(),
            spot_lights: Vec::new(),
            sky: None,
            specular_environment: None,
        }
    }

    /// Union of all entity world bounds.
    #[must_use]
    pub fn bounds(&self) -> Option<BoundingBox> {
        shadow_utils::scene_bounds(&self.entities)
    }

    /// Shadow volume of the directional light fitted to the current scene.
    ///
    /// `None` when there is no directional light or no geometry to cast
    /// shadows; the renderer then skips the shadow render.
    #[must_use]
    pub fn directional_shadow_volume(&self) -> Option<DirectionalShadowVolume> {
        let light = self.directional_light.as_ref()?;
        let bounds = self.bounds()?;
        Some(shadow_utils::fit_directional_shadow(light.direction(), &bounds))
    }

    /// Sets the camera aspect ratio from a viewport size.
    pub fn fit_camera_to(&mut self, size: Vec2) {
        if size.y > 0.0 {
            self.camera.aspect = size.x / size.y;
        }
    }

    /// Camera world position, convenience for shading uniforms.
    #[must_use]
    pub fn camera_position(&self) -> Vec3 {
        self.camera.position
    }
}
