//! Analytic light sources.
//!
//! Units follow photometric conventions: directional intensity is
//! illuminance (lux), point and spot intensity is luminous flux (lumen).

use glam::{Mat4, Vec3};

use crate::resources::cube::CubeFace;

/// Extra radius added to punctual light volumes so the proxy sphere, whose
/// facets lie inside the true sphere, still covers the whole range.
pub const LIGHT_VOLUME_PADDING: f32 = 0.1;

fn normalize_or(direction: Vec3, fallback: Vec3) -> Vec3 {
    direction.try_normalize().unwrap_or(fallback)
}

// ============================================================================
// Directional
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub intensity: f32,
    pub color: Vec3,
    direction: Vec3,
}

impl DirectionalLight {
    #[must_use]
    pub fn new(intensity: f32, direction: Vec3, color: Vec3) -> Self {
        Self {
            intensity,
            color,
            direction: normalize_or(direction, Vec3::NEG_Y),
        }
    }

    /// Normalized direction the light travels in.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = normalize_or(direction, self.direction);
    }
}

// ============================================================================
// Point
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f32,
    pub color: Vec3,
    pub near: f32,
    /// Far clip of the shadow cube and culling radius.
    pub range: f32,
    pub shadow_bias: f32,
    pub use_shadow: bool,
}

impl PointLight {
    #[must_use]
    pub fn new(position: Vec3, intensity: f32, color: Vec3, range: f32) -> Self {
        Self {
            position,
            intensity,
            color,
            near: 0.1,
            range,
            shadow_bias: 0.005,
            use_shadow: true,
        }
    }

    /// View-projections of the six shadow cube faces, in layer order.
    #[must_use]
    pub fn face_view_projections(&self) -> [Mat4; 6] {
        CubeFace::ALL.map(|face| face.view_projection(self.position, self.near, self.range))
    }

    /// Transform of the unit proxy sphere bounding the light volume.
    #[must_use]
    pub fn volume_model_matrix(&self) -> Mat4 {
        light_volume_matrix(self.position, self.range)
    }
}

// ============================================================================
// Spot
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub intensity: f32,
    pub color: Vec3,
    pub near: f32,
    pub range: f32,
    direction: Vec3,
    /// Cone half-angle in radians.
    pub angle: f32,
    /// Penumbra as a fraction of the cone, in `[0, 1]`.
    pub blend: f32,
}

impl SpotLight {
    #[must_use]
    pub fn new(position: Vec3, direction: Vec3, intensity: f32, color: Vec3, range: f32, angle: f32) -> Self {
        Self {
            position,
            intensity,
            color,
            near: 0.1,
            range,
            direction: normalize_or(direction, Vec3::NEG_Y),
            angle,
            blend: 0.15,
        }
    }

    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = normalize_or(direction, self.direction);
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        // look_at degenerates when the cone points straight along the up axis
        let up = if self.direction.y.abs() > 0.999 { Vec3::Z } else { Vec3::Y };
        let view = Mat4::look_at_rh(self.position, self.position + self.direction, up);
        let fov = (self.angle * 2.0).clamp(1e-3, std::f32::consts::PI - 1e-3);
        Mat4::perspective_rh(fov, 1.0, self.near, self.range) * view
    }

    #[must_use]
    pub fn volume_model_matrix(&self) -> Mat4 {
        light_volume_matrix(self.position, self.range)
    }

    /// Cosines of the inner (full intensity) and outer cone edges.
    #[must_use]
    pub fn cone_cosines(&self) -> (f32, f32) {
        let outer = self.angle;
        let inner = self.angle * (1.0 - self.blend.clamp(0.0, 1.0));
        (inner.cos(), outer.cos())
    }
}

fn light_volume_matrix(position: Vec3, range: f32) -> Mat4 {
    Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(range + LIGHT_VOLUME_PADDING))
}
