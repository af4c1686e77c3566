//! GPU uniform blocks.
//!
//! Each struct mirrors a WGSL struct of the same name (snake_case fields,
//! std140-compatible padding). Explicit `_pad` fields keep the Rust size
//! equal to the WGSL size so dynamic-offset tables bind whole elements.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::scene::camera::Camera;
use crate::scene::entity::MeshEntity;
use crate::scene::light::{DirectionalLight, PointLight, SpotLight};

// ============================================================================
// Camera / Object
// ============================================================================

/// `Camera` in `common.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view_projection: Mat4,
    pub inverse_view_projection: Mat4,
    pub position: Vec3,
    pub near: f32,
    pub far: f32,
    pub _pad: f32,
    /// Render target size in pixels.
    pub viewport: Vec2,
}

impl CameraUniforms {
    #[must_use]
    pub fn new(camera: &Camera, viewport: Vec2) -> Self {
        let view_projection = camera.view_projection_matrix();
        Self {
            view_projection,
            inverse_view_projection: view_projection.inverse(),
            position: camera.position,
            near: camera.near,
            far: camera.far,
            _pad: 0.0,
            viewport,
        }
    }
}

/// `Object` in `common.wgsl`; one entry per mesh entity.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: Mat4,
    pub normal_matrix: Mat4,
    pub emissive_intensity: f32,
    pub _pad: [f32; 3],
}

impl ObjectUniforms {
    #[must_use]
    pub fn new(entity: &MeshEntity, emissive_intensity: f32) -> Self {
        Self {
            model: entity.model_matrix(),
            normal_matrix: entity.normal_matrix(),
            emissive_intensity,
            _pad: [0.0; 3],
        }
    }
}

// ============================================================================
// Shadows
// ============================================================================

/// `ShadowView` in `shadow_depth.wgsl`; one entry per rendered shadow face.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct ShadowViewUniforms {
    pub view_projection: Mat4,
    pub light_position: Vec3,
    /// Distance normalisation for cube shadows; unused by 2D maps.
    pub range: f32,
}

// ============================================================================
// Lights
// ============================================================================

/// `DirectionalLight` in `directional_light.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DirectionalLightUniforms {
    pub shadow_view_projection: Mat4,
    pub direction: Vec3,
    pub intensity: f32,
    pub color: Vec3,
    /// 1 when the shadow map holds a valid render, 0 otherwise.
    pub has_shadow: u32,
}

impl DirectionalLightUniforms {
    #[must_use]
    pub fn new(light: &DirectionalLight, shadow_view_projection: Option<Mat4>) -> Self {
        Self {
            shadow_view_projection: shadow_view_projection.unwrap_or(Mat4::IDENTITY),
            direction: light.direction(),
            intensity: light.intensity,
            color: light.color,
            has_shadow: u32::from(shadow_view_projection.is_some()),
        }
    }
}

/// `PointLight` in `point_light.wgsl`. `volume` must stay the first member:
/// the stencil shader reads it through a shorter struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PointLightUniforms {
    pub volume: Mat4,
    pub position: Vec3,
    pub intensity: f32,
    pub color: Vec3,
    pub range: f32,
    pub shadow_bias: f32,
    pub use_shadow: u32,
    pub _pad: [f32; 2],
}

impl PointLightUniforms {
    #[must_use]
    pub fn new(light: &PointLight) -> Self {
        Self {
            volume: light.volume_model_matrix(),
            position: light.position,
            intensity: light.intensity,
            color: light.color,
            range: light.range,
            shadow_bias: light.shadow_bias,
            use_shadow: u32::from(light.use_shadow),
            _pad: [0.0; 2],
        }
    }
}

/// `SpotLight` in `spot_light.wgsl`. `volume` first, as for point lights.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpotLightUniforms {
    pub volume: Mat4,
    pub shadow_view_projection: Mat4,
    pub position: Vec3,
    pub intensity: f32,
    pub direction: Vec3,
    pub range: f32,
    pub color: Vec3,
    pub cos_inner: f32,
    pub cos_outer: f32,
    pub _pad: [f32; 3],
}

impl SpotLightUniforms {
    #[must_use]
    pub fn new(light: &SpotLight) -> Self {
        let (cos_inner, cos_outer) = light.cone_cosines();
        Self {
            volume: light.volume_model_matrix(),
            shadow_view_projection: light.view_projection(),
            position: light.position,
            intensity: light.intensity,
            direction: light.direction(),
            range: light.range,
            color: light.color,
            cos_inner,
            cos_outer,
            _pad: [0.0; 3],
        }
    }
}

// ============================================================================
// Environment / Post
// ============================================================================

/// `Sky` in `sky.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct SkyUniforms {
    pub intensity: f32,
    pub _pad: [f32; 3],
}

/// `Exposure` in `exposure.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct ExposureUniforms {
    pub exposure: f32,
    pub _pad: [f32; 3],
}

/// `ToneMap` in `tone_mapping.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct ToneMapUniforms {
    /// 1 when the output view does not encode sRGB itself.
    pub apply_gamma: u32,
    pub _pad: [u32; 3],
}
