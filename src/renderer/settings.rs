//! Renderer Settings
//!
//! The pipeline topology is fixed: one deferred path with stencil-culled
//! light volumes, single-tap shadow maps, split-sum IBL and physically based
//! auto-exposure. What remains configurable is sizing and the starting state
//! of the exposure model.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use umbra::renderer::RendererSettings;
//!
//! let settings = RendererSettings {
//!     vsync: false,
//!     directional_shadow_size: 2048,
//!     ..Default::default()
//! };
//! ```
//!
//! # Defaults
//!
//! | Field                     | Default            |
//! |---------------------------|--------------------|
//! | `power_preference`        | `HighPerformance`  |
//! | `vsync`                   | `true`             |
//! | `directional_shadow_size` | 4096               |
//! | `point_shadow_size`       | 512                |
//! | `spot_shadow_size`        | 512                |
//! | `exposure_compensation`   | 0.0 EV             |
//! | `initial_luminance`       | 1.0 cd/m²          |
//! | `gbuffer_stencil_marker`  | 128                |

#[derive(Debug, Clone, PartialEq)]
pub struct RendererSettings {
    /// GPU adapter power preference.
    pub power_preference: wgpu::PowerPreference,

    /// Present with vertical sync. Only used for windowed output.
    pub vsync: bool,

    /// Side of the square directional shadow map, in texels.
    pub directional_shadow_size: u32,

    /// Side of each point-light shadow cube face, in texels.
    pub point_shadow_size: u32,

    /// Side of the square spot-light shadow map, in texels.
    pub spot_shadow_size: u32,

    /// Exposure compensation subtracted from the target EV.
    pub exposure_compensation: f32,

    /// Average luminance the exposure model starts from.
    pub initial_luminance: f32,

    /// Stencil value the geometry pass writes for covered pixels.
    ///
    /// Sky, directional and IBL passes test this bit. The punctual light
    /// passes clear the stencil for their volume counter, so they run last.
    pub gbuffer_stencil_marker: u32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            vsync: true,
            directional_shadow_size: 4096,
            point_shadow_size: 512,
            spot_shadow_size: 512,
            exposure_compensation: 0.0,
            initial_luminance: 1.0,
            gbuffer_stencil_marker: 128,
        }
    }
}
