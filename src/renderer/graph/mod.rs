//! Frame organisation.
//!
//! - [`RenderGraph`]: ordered list of [`RenderNode`]s recorded on one encoder
//! - [`FrameBuffers`]: screen-sized targets shared by the passes
//! - [`GlobalBindings`]: camera and per-entity uniforms
//! - [`PassState`]: fixed-function state of every pass
//! - [`passes`]: the deferred passes themselves

pub mod context;
pub mod frame;
pub mod globals;
pub mod graph;
pub mod node;
pub mod passes;
pub mod pipeline;
pub mod render_state;
pub mod shadow_utils;

pub use context::{ExecuteContext, PrepareContext};
pub use frame::{FrameBuffers, RenderTarget};
pub use globals::GlobalBindings;
pub use graph::RenderGraph;
pub use node::RenderNode;
pub use render_state::{BlendMode, PassState};
