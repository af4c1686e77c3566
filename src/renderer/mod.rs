//! Deferred renderer.
//!
//! - [`core`]: device, shaders, uniform buffers, mipmaps, readback
//! - [`graph`]: frame buffers, pass state and the passes
//! - [`SceneRenderer`]: builds the passes and runs a frame
//! - [`OffscreenTarget`]: windowless output for tests and tools

pub mod core;
pub mod graph;
pub mod offscreen;
pub mod scene_renderer;
pub mod settings;

pub use offscreen::{OFFSCREEN_FORMAT, OffscreenTarget};
pub use scene_renderer::SceneRenderer;
pub use settings::RendererSettings;
