//! Physically based auto-exposure.
//!
//! Converts the measured average scene luminance into an exposure multiplier
//! by solving a simulated aperture / shutter / ISO triangle, the way a camera
//! in program mode would.
//!
//! | quantity | start | clamp |
//! |---|---|---|
//! | aperture (f-number) | 4.0 | `[1.8, 22]` |
//! | shutter (s) | 1/100 | `[1/4000, 1/30]` |
//! | ISO | solved | `[100, 6400]` |

pub const APERTURE_RANGE: (f32, f32) = (1.8, 22.0);
pub const SHUTTER_RANGE: (f32, f32) = (1.0 / 4000.0, 1.0 / 30.0);
pub const ISO_RANGE: (f32, f32) = (100.0, 6400.0);

const INITIAL_APERTURE: f32 = 4.0;
const INITIAL_SHUTTER: f32 = 1.0 / 100.0;
/// Reflected-light meter calibration constant.
const METER_CALIBRATION: f32 = 12.5;
/// Saturation-based sensitivity factor (`78 / (0.65 * 100)`), scaled to ISO 100.
const SATURATION_FACTOR: f32 = 7800.0 / 65.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicallyBasedCamera {
    average_luminance: f32,
    exposure_compensation: f32,
    aperture: f32,
    shutter_speed: f32,
    iso: f32,
    exposure: f32,
}

impl PhysicallyBasedCamera {
    /// Starts from `average_luminance` and solves the triangle once.
    #[must_use]
    pub fn new(average_luminance: f32, exposure_compensation: f32) -> Self {
        let mut camera = Self {
            average_luminance,
            exposure_compensation,
            aperture: INITIAL_APERTURE,
            shutter_speed: INITIAL_SHUTTER,
            iso: ISO_RANGE.0,
            exposure: 1.0,
        };
        camera.update(average_luminance, 0.0);
        camera
    }

    /// Blends towards `luminance` with a one second time constant, then
    /// re-solves aperture, shutter speed and ISO.
    pub fn update(&mut self, luminance: f32, delta_time: f32) {
        // a NaN from a broken readback must not poison the running average
        let luminance = if luminance.is_finite() { luminance.max(0.0) } else { self.average_luminance };
        self.average_luminance += (luminance - self.average_luminance) * (1.0 - (-delta_time).exp());

        let target_ev = (self.average_luminance * 100.0 / METER_CALIBRATION).log2() - self.exposure_compensation;

        let aperture = INITIAL_APERTURE;
        let shutter = INITIAL_SHUTTER;

        let iso = (aperture * aperture * 100.0 / (shutter * target_ev.exp2())).clamp(ISO_RANGE.0, ISO_RANGE.1);

        let ev_diff = target_ev - exposure_value(aperture, shutter, iso);
        let aperture = (aperture * std::f32::consts::SQRT_2.powf(ev_diff * 0.5))
            .clamp(APERTURE_RANGE.0, APERTURE_RANGE.1);

        let ev_diff = target_ev - exposure_value(aperture, shutter, iso);
        let shutter = (shutter * (-ev_diff).exp2()).clamp(SHUTTER_RANGE.0, SHUTTER_RANGE.1);

        let max_luminance = SATURATION_FACTOR * aperture * aperture / (iso * shutter);

        self.aperture = aperture;
        self.shutter_speed = shutter;
        self.iso = iso;
        self.exposure = 1.0 / max_luminance;
    }

    #[must_use]
    pub fn average_luminance(&self) -> f32 {
        self.average_luminance
    }

    #[must_use]
    pub fn exposure_compensation(&self) -> f32 {
        self.exposure_compensation
    }

    pub fn set_exposure_compensation(&mut self, ev: f32) {
        self.exposure_compensation = ev;
    }

    #[must_use]
    pub fn aperture(&self) -> f32 {
        self.aperture
    }

    #[must_use]
    pub fn shutter_speed(&self) -> f32 {
        self.shutter_speed
    }

    #[must_use]
    pub fn iso(&self) -> f32 {
        self.iso
    }

    /// Multiplier applied to HDR radiance before tone mapping.
    #[must_use]
    pub fn exposure(&self) -> f32 {
        self.exposure
    }
}

/// EV at ISO 100 equivalent for the given settings.
fn exposure_value(aperture: f32, shutter: f32, iso: f32) -> f32 {
    (aperture * aperture * 100.0 / (shutter * iso)).log2()
}
