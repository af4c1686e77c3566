//! Interactive viewer.
//!
//! A fixed-size, non-resizable window that renders one scene every frame:
//!
//! ```rust,ignore
//! use umbra::app::Viewer;
//!
//! fn main() -> umbra::errors::Result<()> {
//!     Viewer::new().with_scene_file("scenes/room.scene").run()
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::assets::{AssetStore, create_test_scene, load_scene_file};
use crate::errors::{Result, UmbraError};
use crate::renderer::core::{PresentationSurface, WgpuContext};
use crate::renderer::{RendererSettings, SceneRenderer};
use crate::scene::Scene;
use crate::utils::FpsCounter;

pub const WINDOW_WIDTH: u32 = 960;
pub const WINDOW_HEIGHT: u32 = 540;

/// Viewer builder.
pub struct Viewer {
    title: String,
    settings: RendererSettings,
    scene_file: Option<PathBuf>,
}

impl Viewer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Umbra".into(),
            settings: RendererSettings::default(),
            scene_file: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RendererSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Scene to show; the built-in test scene is used without one.
    #[must_use]
    pub fn with_scene_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.scene_file = Some(path.into());
        self
    }

    /// Blocks until the window is closed.
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = ViewerRunner {
            viewer: self,
            window: None,
            state: None,
            error: None,
            fps: FpsCounter::new(),
            last_frame: Instant::now(),
        };
        event_loop.run_app(&mut runner)?;
        runner.error.map_or(Ok(()), Err)
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything that exists once the window does.
struct ViewerState {
    ctx: WgpuContext,
    surface: PresentationSurface,
    renderer: SceneRenderer,
    scene: Scene,
    assets: AssetStore,
}

impl ViewerState {
    fn new(window: Arc<Window>, viewer: &Viewer) -> Result<Self> {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));
        let (ctx, surface) = pollster::block_on(WgpuContext::new_with_window(window, &viewer.settings, width, height))?;

        let aspect = width as f32 / height as f32;
        let (scene, assets) = match &viewer.scene_file {
            Some(path) => load_scene_file(&ctx.device, &ctx.queue, path, aspect)?,
            None => {
                log::info!("No scene file given, showing the test scene");
                create_test_scene(&ctx.device, &ctx.queue, aspect)?
            }
        };
        log::info!(
            "Scene: {} entities, {} point lights, {} spot lights",
            scene.entities.len(),
            scene.point_lights.len(),
            scene.spot_lights.len()
        );

        let renderer = SceneRenderer::new(&ctx.device, viewer.settings.clone(), width, height, surface.format())?;
        Ok(Self {
            ctx,
            surface,
            renderer,
            scene,
            assets,
        })
    }

    fn render(&mut self, delta_time: f32) -> Result<()> {
        let frame = self.surface.acquire(&self.ctx.device)?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer
            .render(&self.ctx.device, &self.ctx.queue, &self.scene, &self.assets, &view, delta_time)?;
        frame.present();
        Ok(())
    }
}

struct ViewerRunner {
    viewer: Viewer,
    window: Option<Arc<Window>>,
    state: Option<ViewerState>,
    /// First fatal error, returned from [`Viewer::run`].
    error: Option<UmbraError>,
    fps: FpsCounter,
    last_frame: Instant,
}

impl ViewerRunner {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: UmbraError) {
        log::error!("Viewer error: {error}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for ViewerRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(&self.viewer.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_resizable(false);
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        self.window = Some(window.clone());

        log::info!("Initializing renderer...");
        match ViewerState::new(window, &self.viewer) {
            Ok(state) => self.state = Some(state),
            Err(e) => return self.fail(event_loop, e),
        }
        self.last_frame = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                let Some(state) = self.state.as_mut() else {
                    return;
                };
                let now = Instant::now();
                let delta_time = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;

                if let Err(e) = state.render(delta_time) {
                    return self.fail(event_loop, e);
                }
                if let Some(fps) = self.fps.update() {
                    let camera = state.renderer.physical_camera();
                    log::info!("FPS: {fps:.1} (exposure {:.5})", camera.exposure());
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.state.is_some()
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }
}
