use glam::{Mat4, Vec3};

use crate::assets::{MaterialHandle, MeshHandle};
use crate::resources::bounds::BoundingBox;
use crate::scene::camera::derive_rotation_matrix;

/// Placement of a mesh in the world.
///
/// The entity refers to its mesh and material through arena handles and keeps
/// a copy of the mesh's local bounds, so world bounds can be derived without
/// touching the asset store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshEntity {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    local_bounds: BoundingBox,
    pub position: Vec3,
    /// Euler angles in radians, applied in Y-X-Z order.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl MeshEntity {
    #[must_use]
    pub fn new(mesh: MeshHandle, material: MaterialHandle, local_bounds: BoundingBox) -> Self {
        Self {
            mesh,
            material,
            local_bounds,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        self.position = position;
        self.rotation = rotation;
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn local_bounds(&self) -> BoundingBox {
        self.local_bounds
    }

    /// `translate * rotate * scale`
    #[must_use]
    pub fn model_matrix(&self) -> Mat4 {
        derive_model_matrix(self.position, self.rotation, self.scale)
    }

    /// Inverse-transpose of the model matrix, for transforming normals.
    #[must_use]
    pub fn normal_matrix(&self) -> Mat4 {
        self.model_matrix().inverse().transpose()
    }

    #[must_use]
    pub fn world_bounds(&self) -> BoundingBox {
        self.local_bounds.transform(&self.model_matrix())
    }

    /// Sphere test against the world bounds, used to skip shadow casters
    /// outside a punctual light's range.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.world_bounds().intersects_sphere(center, radius)
    }
}

#[must_use]
pub fn derive_model_matrix(position: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position) * derive_rotation_matrix(rotation) * Mat4::from_scale(scale)
}
