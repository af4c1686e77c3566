//! Deferred scene renderer.
//!
//! A frame runs as two graphs on the same device:
//!
//! ```text
//! scene graph:  geometry → depth transfer → sky → emissive → directional
//!               → specular IBL → point lights → spot lights → log average
//!               ── submit, read back 1x1 log luminance ──
//!               physical camera update
//! post graph:   exposure → tone mapping → output
//! ```
//!
//! The readback between the graphs is the frame's only CPU/GPU sync point.

use glam::Vec2;

use crate::assets::AssetStore;
use crate::errors::Result;
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::passes::{
    DepthTransferPass, DirectionalLightPass, EmissivePass, ExposurePass, GeometryPass, LogAveragePass,
    PointLightPass, SkyPass, SpecularIblPass, SpotLightPass, ToneMappingPass,
};
use crate::renderer::graph::{FrameBuffers, GlobalBindings, RenderGraph};
use crate::renderer::settings::RendererSettings;
use crate::scene::{PhysicallyBasedCamera, Scene};

pub struct SceneRenderer {
    settings: RendererSettings,
    frame: FrameBuffers,
    globals: GlobalBindings,
    scene_graph: RenderGraph,
    post_graph: RenderGraph,
    physical_camera: PhysicallyBasedCamera,
    output_format: wgpu::TextureFormat,
}

impl SceneRenderer {
    /// Builds every pass for a `width`x`height` frame tone-mapped into
    /// `output_format`.
    pub fn new(
        device: &wgpu::Device,
        settings: RendererSettings,
        width: u32,
        height: u32,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let frame = FrameBuffers::new(device, width, height);
        let globals = GlobalBindings::new(device)?;
        let marker = settings.gbuffer_stencil_marker;

        let scene_graph = RenderGraph::new("Scene Graph")
            .with_node(Box::new(GeometryPass::new(device, &globals, marker)?))
            .with_node(Box::new(DepthTransferPass))
            .with_node(Box::new(SkyPass::new(device, &globals, marker)?))
            .with_node(Box::new(EmissivePass::new(device, &globals, &frame, marker)?))
            .with_node(Box::new(DirectionalLightPass::new(
                device,
                &globals,
                &frame,
                settings.directional_shadow_size,
                marker,
            )?))
            .with_node(Box::new(SpecularIblPass::new(device, &globals, &frame, marker)?))
            .with_node(Box::new(PointLightPass::new(device, &globals, &frame, settings.point_shadow_size)?))
            .with_node(Box::new(SpotLightPass::new(device, &globals, &frame, settings.spot_shadow_size)?))
            .with_node(Box::new(LogAveragePass::new(device, &frame)?));

        let post_graph = RenderGraph::new("Post Graph")
            .with_node(Box::new(ExposurePass::new(device, &frame)?))
            .with_node(Box::new(ToneMappingPass::new(device, &frame, output_format)?));

        log::info!(
            "Scene renderer ready: {} scene passes, {} post passes",
            scene_graph.node_count(),
            post_graph.node_count()
        );

        let physical_camera = PhysicallyBasedCamera::new(settings.initial_luminance, settings.exposure_compensation);

        Ok(Self {
            settings,
            frame,
            globals,
            scene_graph,
            post_graph,
            physical_camera,
            output_format,
        })
    }

    /// Renders `scene` into `output`, which must have the format the renderer
    /// was built for and the frame size.
    ///
    /// `delta_time` (seconds) drives the eye adaptation; `0.0` keeps the
    /// exposure where it was.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        assets: &AssetStore,
        output: &wgpu::TextureView,
        delta_time: f32,
    ) -> Result<()> {
        let (width, height) = self.frame.size();
        self.globals
            .update(device, queue, scene, assets, Vec2::new(width as f32, height as f32));

        let mut prepare = PrepareContext {
            device,
            queue,
            scene,
            assets,
            globals: &self.globals,
            frame: &self.frame,
            exposure: self.physical_camera.exposure(),
        };
        self.scene_graph.prepare(&mut prepare);
        self.scene_graph.execute(
            &ExecuteContext {
                device,
                scene,
                assets,
                globals: &self.globals,
                frame: &self.frame,
                output: None,
            },
            queue,
        );

        let luminance = self.frame.read_average_luminance(device)?;
        self.physical_camera.update(luminance, delta_time);
        log::debug!(
            "Average luminance {luminance:.4} cd/m², exposure {:.6} (f/{:.1}, {:.5}s, ISO {:.0})",
            self.physical_camera.exposure(),
            self.physical_camera.aperture(),
            self.physical_camera.shutter_speed(),
            self.physical_camera.iso()
        );

        let mut prepare = PrepareContext {
            device,
            queue,
            scene,
            assets,
            globals: &self.globals,
            frame: &self.frame,
            exposure: self.physical_camera.exposure(),
        };
        self.post_graph.prepare(&mut prepare);
        self.post_graph.execute(
            &ExecuteContext {
                device,
                scene,
                assets,
                globals: &self.globals,
                frame: &self.frame,
                output: Some(output),
            },
            queue,
        );
        Ok(())
    }

    /// Drops bind groups built from asset handles. Call after rendering from
    /// a different [`AssetStore`].
    pub fn invalidate_asset_bindings(&mut self) {
        self.scene_graph.invalidate();
        self.post_graph.invalidate();
    }

    #[must_use]
    pub fn physical_camera(&self) -> &PhysicallyBasedCamera {
        &self.physical_camera
    }

    pub fn physical_camera_mut(&mut self) -> &mut PhysicallyBasedCamera {
        &mut self.physical_camera
    }

    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.frame.size()
    }

    #[must_use]
    pub fn output_format(&self) -> wgpu::TextureFormat {
        self.output_format
    }
}
