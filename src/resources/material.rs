//! PBR materials.
//!
//! A material is an immutable set of texture handles into the asset store.
//! The partial variants leave slots empty; [`Material::slots`] fills them
//! from [`DefaultTextures`] so every draw binds five textures.

use crate::assets::TextureHandle;

/// 1x1 textures substituted for absent material slots and failed loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultTextures {
    pub white: TextureHandle,
    pub black: TextureHandle,
    /// Tangent-space +Z, encoded `(128, 128, 255)`.
    pub flat_normal: TextureHandle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PbrMaps {
    pub albedo: TextureHandle,
    pub metallic: TextureHandle,
    pub roughness: TextureHandle,
    pub normal: TextureHandle,
    pub emissive: TextureHandle,
    /// Luminance scale of the emissive map, in cd/m² at full map value.
    pub emissive_intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    Albedo { albedo: TextureHandle },
    AlbedoNormal { albedo: TextureHandle, normal: TextureHandle },
    Pbr(PbrMaps),
}

/// The five textures the geometry pass binds, in binding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialSlots {
    pub albedo: TextureHandle,
    pub metallic: TextureHandle,
    pub roughness: TextureHandle,
    pub normal: TextureHandle,
    pub emissive: TextureHandle,
}

impl MaterialSlots {
    #[must_use]
    pub fn as_array(&self) -> [TextureHandle; 5] {
        [self.albedo, self.metallic, self.roughness, self.normal, self.emissive]
    }
}

impl Material {
    /// Resolves every slot; absent ones shade as a rough, non-emissive
    /// dielectric with the geometric normal.
    #[must_use]
    pub fn slots(&self, defaults: &DefaultTextures) -> MaterialSlots {
        let fallback = MaterialSlots {
            albedo: defaults.white,
            metallic: defaults.black,
            roughness: defaults.white,
            normal: defaults.flat_normal,
            emissive: defaults.black,
        };
        match *self {
            Material::Albedo { albedo } => MaterialSlots { albedo, ..fallback },
            Material::AlbedoNormal { albedo, normal } => MaterialSlots {
                albedo,
                normal,
                ..fallback
            },
            Material::Pbr(maps) => MaterialSlots {
                albedo: maps.albedo,
                metallic: maps.metallic,
                roughness: maps.roughness,
                normal: maps.normal,
                emissive: maps.emissive,
            },
        }
    }

    #[must_use]
    pub fn emissive_intensity(&self) -> f32 {
        match self {
            Material::Pbr(maps) => maps.emissive_intensity,
            _ => 0.0,
        }
    }
}
