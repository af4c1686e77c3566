use crate::renderer::graph::context::ExecuteContext;
use crate::renderer::graph::node::RenderNode;

/// Copies G-buffer depth and stencil into the HDR depth target, so lighting
/// can depth-test light volumes and test the marker without touching the
/// G-buffer.
pub struct DepthTransferPass;

impl RenderNode for DepthTransferPass {
    fn name(&self) -> &'static str {
        "Depth Transfer"
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let (width, height) = ctx.frame.size();
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: ctx.frame.gbuffer_depth().texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: ctx.frame.hdr_depth().texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}
