pub mod description;
pub mod loader;
pub mod scenefile;
pub mod storage;
pub mod store;

use slotmap::new_key_type;

// Strongly-typed handles into the asset arenas
new_key_type! {
    pub struct MeshHandle;
    pub struct MaterialHandle;
    pub struct TextureHandle;
}

pub use description::SceneDescription;
pub use loader::{build_scene, create_test_scene, load_scene_file};
pub use storage::AssetStorage;
pub use store::AssetStore;
