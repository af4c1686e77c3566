//! Linear render graph.
//!
//! Nodes execute strictly in insertion order on one command encoder, which is
//! submitted when the graph finishes. The renderer owns two graphs because
//! exposure needs the luminance readback of the first one.

use super::context::{ExecuteContext, PrepareContext};
use super::node::RenderNode;

pub struct RenderGraph {
    label: &'static str,
    nodes: Vec<Box<dyn RenderNode>>,
}

impl RenderGraph {
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            nodes: Vec::new(),
        }
    }

    /// Appends a node; nodes run in the order they were added.
    #[inline]
    pub fn add_node(&mut self, node: Box<dyn RenderNode>) {
        self.nodes.push(node);
    }

    #[inline]
    #[must_use]
    pub fn with_node(mut self, node: Box<dyn RenderNode>) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn prepare(&mut self, ctx: &mut PrepareContext) {
        for node in &mut self.nodes {
            node.prepare(ctx);
        }
    }

    pub fn invalidate(&mut self) {
        for node in &mut self.nodes {
            node.invalidate();
        }
    }

    /// Records every node and submits the result.
    pub fn execute(&self, ctx: &ExecuteContext, queue: &wgpu::Queue) {
        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(self.label),
        });

        for node in &self.nodes {
            encoder.push_debug_group(node.name());
            node.run(ctx, &mut encoder);
            encoder.pop_debug_group();
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn node_names(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|node| node.name()).collect()
    }
}
