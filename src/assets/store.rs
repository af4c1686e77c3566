use std::path::Path;

use crate::assets::storage::AssetStorage;
use crate::assets::{MaterialHandle, MeshHandle, TextureHandle};
use crate::errors::Result;
use crate::renderer::core::MipmapGenerator;
use crate::resources::material::{DefaultTextures, Material};
use crate::resources::mesh::{Mesh, MeshData};
use crate::resources::texture::{ColorSpace, HDR_FORMAT, Texture};

/// Owner of every mesh, material and texture a scene references.
///
/// Entities and the scene keep handles only. The store lives as long as the
/// scene it was loaded with and drops all GPU objects with it.
pub struct AssetStore {
    pub meshes: AssetStorage<MeshHandle, Mesh>,
    pub materials: AssetStorage<MaterialHandle, Material>,
    pub textures: AssetStorage<TextureHandle, Texture>,
    defaults: DefaultTextures,
    mipmaps: MipmapGenerator,
}

impl AssetStore {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self> {
        let mipmaps = MipmapGenerator::new(
            device,
            &[
                wgpu::TextureFormat::Rgba8UnormSrgb,
                wgpu::TextureFormat::Rgba8Unorm,
                HDR_FORMAT,
            ],
        )?;

        let mut textures = AssetStorage::new();
        let defaults = DefaultTextures {
            white: textures.add_keyed(
                "<white>",
                Texture::solid(device, queue, [255, 255, 255, 255], ColorSpace::Linear, "Default White"),
            ),
            black: textures.add_keyed(
                "<black>",
                Texture::solid(device, queue, [0, 0, 0, 255], ColorSpace::Linear, "Default Black"),
            ),
            flat_normal: textures.add_keyed(
                "<flat-normal>",
                Texture::solid(device, queue, [128, 128, 255, 255], ColorSpace::Linear, "Default Normal"),
            ),
        };

        Ok(Self {
            meshes: AssetStorage::new(),
            materials: AssetStorage::new(),
            textures,
            defaults,
            mipmaps,
        })
    }

    #[must_use]
    pub fn defaults(&self) -> &DefaultTextures {
        &self.defaults
    }

    #[must_use]
    pub fn mipmaps(&self) -> &MipmapGenerator {
        &self.mipmaps
    }

    // ========================================================================
    // Registration
    // ========================================================================

    pub fn add_mesh(&mut self, device: &wgpu::Device, label: &str, data: &MeshData) -> Result<MeshHandle> {
        let mesh = Mesh::upload(device, label, data)?;
        Ok(self.meshes.add(mesh))
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.add(material)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureHandle {
        self.textures.add(texture)
    }

    // ========================================================================
    // File loading
    // ========================================================================

    /// Loads an LDR image once per path.
    pub fn load_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        color_space: ColorSpace,
    ) -> Result<TextureHandle> {
        let key = path.display().to_string();
        if let Some(handle) = self.textures.handle_by_key(&key) {
            return Ok(handle);
        }
        let texture = Texture::load_image(device, queue, &self.mipmaps, path, color_space)?;
        log::info!("Loaded texture {key}");
        Ok(self.textures.add_keyed(&key, texture))
    }

    /// Like [`Self::load_texture`], but a failed load is logged and replaced
    /// by `fallback` so the scene still renders.
    pub fn load_texture_or(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        color_space: ColorSpace,
        fallback: TextureHandle,
    ) -> TextureHandle {
        match self.load_texture(device, queue, path, color_space) {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("Failed to load texture {}: {e}", path.display());
                fallback
            }
        }
    }

    /// Equirectangular HDR sky with mipmaps.
    pub fn load_hdr(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Result<TextureHandle> {
        let key = path.display().to_string();
        if let Some(handle) = self.textures.handle_by_key(&key) {
            return Ok(handle);
        }
        let texture = Texture::load_hdr(device, queue, Some(&self.mipmaps), path)?;
        log::info!("Loaded HDR texture {key}");
        Ok(self.textures.add_keyed(&key, texture))
    }

    /// Single-level float lookup table, clamped at the edges.
    pub fn load_lut(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Result<TextureHandle> {
        let key = path.display().to_string();
        if let Some(handle) = self.textures.handle_by_key(&key) {
            return Ok(handle);
        }
        let texture = Texture::load_hdr(device, queue, None, path)?;
        Ok(self.textures.add_keyed(&key, texture))
    }

    pub fn load_specular_cubemap(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        dir: &Path,
    ) -> Result<TextureHandle> {
        let key = dir.display().to_string();
        if let Some(handle) = self.textures.handle_by_key(&key) {
            return Ok(handle);
        }
        let texture = Texture::load_specular_cubemap(device, queue, dir)?;
        log::info!("Loaded specular cubemap {key}");
        Ok(self.textures.add_keyed(&key, texture))
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    #[must_use]
    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    #[must_use]
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    #[must_use]
    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle)
    }

    /// View of a texture, or of the white default when the handle is stale or
    /// the texture owns nothing.
    #[must_use]
    pub fn texture_view_or_white(&self, handle: TextureHandle) -> Option<&wgpu::TextureView> {
        self.texture(handle)
            .and_then(Texture::view)
            .or_else(|| self.texture(self.defaults.white).and_then(Texture::view))
    }
}
