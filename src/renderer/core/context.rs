//! wgpu Context
//!
//! [`WgpuContext`] holds the device and queue every pass and asset upload
//! works against. [`PresentationSurface`] adds the window swapchain for the
//! interactive viewer; headless users (tests, the prefilter tool) never
//! create one.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::{Result, UmbraError};
use crate::renderer::settings::RendererSettings;

/// Core wgpu context holding GPU handles.
pub struct WgpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    /// The wgpu device for GPU operations
    pub device: wgpu::Device,
    /// The command queue for submitting work
    pub queue: wgpu::Queue,
}

impl WgpuContext {
    /// Creates a device without a surface.
    pub async fn new_headless(settings: &RendererSettings) -> Result<Self> {
        let instance = wgpu::Instance::default();
        Self::from_instance(instance, None, settings).await
    }

    /// Creates a device able to present to `window`, plus the configured
    /// surface.
    pub async fn new_with_window<W>(
        window: W,
        settings: &RendererSettings,
        width: u32,
        height: u32,
    ) -> Result<(Self, PresentationSurface)>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let ctx = Self::from_instance(instance, Some(&surface), settings).await?;

        let mut config = surface
            .get_default_config(&ctx.adapter, width, height)
            .ok_or_else(|| {
                UmbraError::AdapterRequestFailed("Surface not supported by adapter".to_string())
            })?;
        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&ctx.device, &config);

        Ok((ctx, PresentationSurface { surface, config }))
    }

    async fn from_instance(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'static>>,
        settings: &RendererSettings,
    ) -> Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| UmbraError::AdapterRequestFailed(e.to_string()))?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?}, {:?})", info.name, info.device_type, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Umbra Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }
}

/// Window swapchain. Fixed size: the viewer window is not resizable.
pub struct PresentationSurface {
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl PresentationSurface {
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Acquires the next frame, reconfiguring once if the surface went stale.
    pub fn acquire(&self, device: &wgpu::Device) -> Result<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(device, &self.config);
                Ok(self.surface.get_current_texture()?)
            }
            Err(e) => Err(e.into()),
        }
    }
}
