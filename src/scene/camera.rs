use glam::{EulerRot, Mat4, Vec2, Vec3};

/// Perspective scene camera.
///
/// Matrices are derived from the fields on demand, so they can never go
/// stale after a mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Euler angles in radians, applied in Y-X-Z order.
    pub rotation: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    /// Looks down `-Z` from `(0, 0, 5)` with a 60° vertical field of view.
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0)
    }
}

impl Camera {
    #[must_use]
    pub fn new(position: Vec3, rotation: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            rotation,
            fov_y,
            aspect,
            near,
            far,
        }
    }

    #[must_use]
    pub fn rotation_matrix(&self) -> Mat4 {
        derive_rotation_matrix(self.rotation)
    }

    /// Camera-to-world transform (`translate * rotate`).
    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * self.rotation_matrix()
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        derive_view_matrix(self.position, self.rotation)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        derive_projection_matrix(self.fov_y, self.aspect, self.near, self.far)
    }

    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// `(near, far)`, used by shaders to linearize depth.
    #[must_use]
    pub fn projection_params(&self) -> Vec2 {
        Vec2::new(self.near, self.far)
    }

    /// Tangents of the half view angles `(x, y)`, used to build view rays.
    #[must_use]
    pub fn half_tangents(&self) -> Vec2 {
        let y = (self.fov_y * 0.5).tan();
        Vec2::new(y * self.aspect, y)
    }
}

/// Rotation from Y-X-Z Euler angles (`Ry * Rx * Rz`).
#[must_use]
pub fn derive_rotation_matrix(rotation: Vec3) -> Mat4 {
    Mat4::from_euler(EulerRot::YXZ, rotation.y, rotation.x, rotation.z)
}

/// Inverse of `translate(position) * rotate(rotation)`.
#[must_use]
pub fn derive_view_matrix(position: Vec3, rotation: Vec3) -> Mat4 {
    (Mat4::from_translation(position) * derive_rotation_matrix(rotation)).inverse()
}

/// Right-handed perspective with a `[0, 1]` depth range.
#[must_use]
pub fn derive_projection_matrix(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_y, aspect, near, far)
}
