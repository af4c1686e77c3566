//! Renderable resources
//!
//! GPU-owning types and the plain data they are built from:
//! - Mesh / MeshData: triangle geometry
//! - Material: texture handle sets
//! - Texture: single-owner GPU textures and their loaders
//! - Owned: the single-owner GPU handle wrapper
//! - Uniforms: Pod mirrors of the WGSL uniform blocks
//! - BoundingBox / CubeFace: shared geometric conventions

pub mod bounds;
pub mod cube;
pub mod handle;
pub mod material;
pub mod mesh;
pub mod primitives;
pub mod texture;
pub mod uniforms;

pub use bounds::BoundingBox;
pub use cube::CubeFace;
pub use handle::{GpuResource, Owned};
pub use material::{DefaultTextures, Material, MaterialSlots, PbrMaps};
pub use mesh::{Mesh, MeshData, Vertex};
pub use texture::{AddressMode, ColorSpace, Texture};
