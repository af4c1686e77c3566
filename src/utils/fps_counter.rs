use std::time::{Duration, Instant};

/// Frame rate averaged over fixed reporting windows.
pub struct FpsCounter {
    window: Duration,
    window_start: Instant,
    frames: u32,
    last_fps: Option<f32>,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    /// Reports once per second.
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs(1))
    }

    #[must_use]
    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            window_start: Instant::now(),
            frames: 0,
            last_fps: None,
        }
    }

    /// Counts one frame. Returns the average rate when a window closes.
    pub fn update(&mut self) -> Option<f32> {
        self.tick(Instant::now())
    }

    fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.window_start = now;
        self.frames = 0;
        self.last_fps = Some(fps);
        Some(fps)
    }

    /// Rate of the last completed window.
    #[must_use]
    pub fn last_fps(&self) -> Option<f32> {
        self.last_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_window() {
        let mut counter = FpsCounter::with_window(Duration::from_secs(1));
        let start = counter.window_start;
        for i in 1..60 {
            assert!(counter.tick(start + Duration::from_millis(i * 16)).is_none());
        }
        let fps = counter.tick(start + Duration::from_secs(1)).unwrap();
        assert!((fps - 60.0).abs() < 1e-3, "fps = {fps}");
        assert_eq!(counter.last_fps(), Some(fps));
    }
}
