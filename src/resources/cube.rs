//! Cube map face conventions.
//!
//! One table drives both the point-light shadow cube and the offline
//! prefiltered environment faces, so a direction rendered into a face is
//! always found again by hardware cube sampling.
//!
//! Face orientation follows the usual look-at table (`+X` looks down `+X`
//! with `-Y` up, and so on). wgpu addresses texel rows top-down, so face
//! projections flip clip-space Y; see [`CubeFace::projection`].

use glam::{Mat4, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl CubeFace {
    /// Faces in array-layer order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
        CubeFace::PosZ,
        CubeFace::NegZ,
    ];

    #[must_use]
    pub fn layer(self) -> u32 {
        self as u32
    }

    /// Outward viewing direction of the face.
    #[must_use]
    pub fn direction(self) -> Vec3 {
        match self {
            CubeFace::PosX => Vec3::X,
            CubeFace::NegX => Vec3::NEG_X,
            CubeFace::PosY => Vec3::Y,
            CubeFace::NegY => Vec3::NEG_Y,
            CubeFace::PosZ => Vec3::Z,
            CubeFace::NegZ => Vec3::NEG_Z,
        }
    }

    #[must_use]
    pub fn up(self) -> Vec3 {
        match self {
            CubeFace::PosY => Vec3::Z,
            CubeFace::NegY => Vec3::NEG_Z,
            _ => Vec3::NEG_Y,
        }
    }

    /// File stem used by the prefilter output layout.
    #[must_use]
    pub fn file_stem(self) -> &'static str {
        match self {
            CubeFace::PosX => "pos-x",
            CubeFace::NegX => "neg-x",
            CubeFace::PosY => "pos-y",
            CubeFace::NegY => "neg-y",
            CubeFace::PosZ => "pos-z",
            CubeFace::NegZ => "neg-z",
        }
    }

    #[must_use]
    pub fn view(self, eye: Vec3) -> Mat4 {
        Mat4::look_at_rh(eye, eye + self.direction(), self.up())
    }

    /// 90° square perspective with clip-space Y flipped to match top-down
    /// texel addressing of cube layers.
    #[must_use]
    pub fn projection(near: f32, far: f32) -> Mat4 {
        Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0))
            * Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, near, far)
    }

    #[must_use]
    pub fn view_projection(self, eye: Vec3, near: f32, far: f32) -> Mat4 {
        Self::projection(near, far) * self.view(eye)
    }

    /// Unnormalized direction through texture coordinate `uv` of this face.
    #[must_use]
    pub fn direction_at(self, uv: Vec2) -> Vec3 {
        let s = 2.0 * uv.x - 1.0;
        let t = 2.0 * uv.y - 1.0;
        match self {
            CubeFace::PosX => Vec3::new(1.0, -t, -s),
            CubeFace::NegX => Vec3::new(-1.0, -t, s),
            CubeFace::PosY => Vec3::new(s, 1.0, t),
            CubeFace::NegY => Vec3::new(s, -1.0, -t),
            CubeFace::PosZ => Vec3::new(s, -t, 1.0),
            CubeFace::NegZ => Vec3::new(-s, -t, -1.0),
        }
    }

    /// Face and texture coordinate that cube sampling selects for `dir`.
    #[must_use]
    pub fn select(dir: Vec3) -> (CubeFace, Vec2) {
        let a = dir.abs();
        let (face, sc, tc, ma) = if a.x >= a.y && a.x >= a.z {
            if dir.x >= 0.0 {
                (CubeFace::PosX, -dir.z, -dir.y, a.x)
            } else {
                (CubeFace::NegX, dir.z, -dir.y, a.x)
            }
        } else if a.y >= a.z {
            if dir.y >= 0.0 {
                (CubeFace::PosY, dir.x, dir.z, a.y)
            } else {
                (CubeFace::NegY, dir.x, -dir.z, a.y)
            }
        } else if dir.z >= 0.0 {
            (CubeFace::PosZ, dir.x, -dir.y, a.z)
        } else {
            (CubeFace::NegZ, -dir.x, -dir.y, a.z)
        };
        let uv = Vec2::new(sc / ma + 1.0, tc / ma + 1.0) * 0.5;
        (face, uv)
    }
}
