//! Render graph contexts.
//!
//! - [`PrepareContext`]: everything a node may read while it uploads its
//!   per-frame uniforms and refreshes bind groups.
//! - [`ExecuteContext`]: read-only view used while recording commands.
//!
//! Both borrow the frame's inputs (scene, assets) and the renderer-owned GPU
//! state (frame buffers, global bindings) for the duration of one graph run.

use crate::assets::AssetStore;
use crate::renderer::graph::frame::FrameBuffers;
use crate::renderer::graph::globals::GlobalBindings;
use crate::scene::Scene;

pub struct PrepareContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub scene: &'a Scene,
    pub assets: &'a AssetStore,
    pub globals: &'a GlobalBindings,
    pub frame: &'a FrameBuffers,
    /// Exposure multiplier solved for this frame. Only meaningful for the
    /// post-processing graph.
    pub exposure: f32,
}

pub struct ExecuteContext<'a> {
    pub device: &'a wgpu::Device,
    pub scene: &'a Scene,
    pub assets: &'a AssetStore,
    pub globals: &'a GlobalBindings,
    pub frame: &'a FrameBuffers,
    /// Final color target, set for the post-processing graph.
    pub output: Option<&'a wgpu::TextureView>,
}
