#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Deferred physically based renderer with stencil-culled light volumes,
//! shadow maps, split-sum image-based lighting and physical auto-exposure,
//! plus the offline prefilter that bakes the lighting assets.

pub mod assets;
pub mod errors;
pub mod ibl;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod utils;

#[cfg(feature = "winit")]
pub mod app;

pub use assets::{AssetStore, SceneDescription, create_test_scene, load_scene_file};
pub use errors::{Result, UmbraError};
pub use renderer::core::WgpuContext;
pub use renderer::{OffscreenTarget, RendererSettings, SceneRenderer};
pub use scene::{Camera, DirectionalLight, MeshEntity, PhysicallyBasedCamera, PointLight, Scene, SpotLight};

#[cfg(feature = "winit")]
pub use app::Viewer;
