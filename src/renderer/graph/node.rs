//! Render node trait.
//!
//! Every pass of the frame implements [`RenderNode`]. A node splits its work
//! into two phases:
//! - `prepare` gets mutable access to the node itself and uploads uniforms,
//!   builds or refreshes bind groups.
//! - `run` records GPU commands only. It must leave no fixed-function state
//!   behind: every pipeline carries its complete [`PassState`].
//!
//! [`PassState`]: super::render_state::PassState

use super::context::{ExecuteContext, PrepareContext};

pub trait RenderNode {
    /// Node name, used as the GPU debug group label.
    fn name(&self) -> &'static str;

    fn prepare(&mut self, _ctx: &mut PrepareContext) {}

    /// Drops bind groups cached from asset handles, after the renderer is
    /// pointed at a different asset store.
    fn invalidate(&mut self) {}

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder);
}
