//! Shadow Utilities
//!
//! Pure math for shadow mapping, kept out of the passes for reuse and
//! testability.
//!
//! # Provided Functions
//!
//! - Directional shadow volume fitting (tight orthographic box around the
//!   scene bounds in light space)
//! - Scene bounds accumulation over mesh entities
//! - Shadow caster selection for punctual lights (sphere vs. AABB)

use glam::{Mat4, Quat, Vec3};
use smallvec::SmallVec;

use crate::resources::bounds::BoundingBox;
use crate::scene::entity::MeshEntity;

/// Indices of entities selected for a shadow draw.
pub type CasterList = SmallVec<[usize; 32]>;

// ============================================================================
// Directional Shadow Volume
// ============================================================================

/// Light-aligned orthographic box enclosing the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalShadowVolume {
    /// Rotation taking the light direction onto `-Z`.
    pub rotation: Quat,
    /// Extrema of the rotated scene corners.
    pub bounds: BoundingBox,
}

impl DirectionalShadowVolume {
    /// `translate(-center_x, -center_y, -max_z) * rotation`
    #[must_use]
    pub fn view(&self) -> Mat4 {
        let center = self.bounds.center();
        Mat4::from_translation(Vec3::new(-center.x, -center.y, -self.bounds.max.z))
            * Mat4::from_quat(self.rotation)
    }

    #[must_use]
    pub fn projection(&self) -> Mat4 {
        let size = self.bounds.size().max(Vec3::splat(1e-3));
        let half_w = size.x * 0.5;
        let half_h = size.y * 0.5;
        // keep casters lying exactly on the near or far face inside the clip volume
        let pad = (size.z * 0.01).max(1e-3);
        Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, -pad, size.z + pad)
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Fits an orthographic shadow volume for `direction` around `scene_bounds`.
///
/// The eight corners are rotated so the light travels along `-Z`, and the
/// axis-aligned extrema of the rotated corners become the volume.
#[must_use]
pub fn fit_directional_shadow(direction: Vec3, scene_bounds: &BoundingBox) -> DirectionalShadowVolume {
    let direction = direction.try_normalize().unwrap_or(Vec3::NEG_Z);
    let rotation = Quat::from_rotation_arc(direction, Vec3::NEG_Z);

    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for corner in scene_bounds.corners() {
        let p = rotation * corner;
        min = min.min(p);
        max = max.max(p);
    }

    DirectionalShadowVolume {
        rotation,
        bounds: BoundingBox::new(min, max),
    }
}

/// Union of all entity world bounds, `None` for an empty scene.
#[must_use]
pub fn scene_bounds(entities: &[MeshEntity]) -> Option<BoundingBox> {
    entities
        .iter()
        .map(MeshEntity::world_bounds)
        .reduce(|acc, b| acc.union(&b))
}

// ============================================================================
// Punctual Light Caster Culling
// ============================================================================

/// Entities whose world bounds touch the sphere `(center, radius)`.
#[must_use]
pub fn casters_in_range(entities: &[MeshEntity], center: Vec3, radius: f32) -> CasterList {
    entities
        .iter()
        .enumerate()
        .filter(|(_, entity)| entity.intersects_sphere(center, radius))
        .map(|(i, _)| i)
        .collect()
}
