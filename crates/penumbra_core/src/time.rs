use std::time::{Duration, Instant};

pub struct Time {
    startup: Instant,
    last_update: Instant,
    delta: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self {
            startup: Instant::now(),
            last_update: Instant::now(),
            delta: Duration::ZERO,
        }
    }
}

impl Time {
    /// Called by the engine loop once per frame
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_update;
        self.last_update = now;
    }

    /// Returns time in seconds since last frame (e.g., 0.016 for 60fps)
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Returns total time since app started
    pub fn elapsed_seconds(&self) -> f32 {
        self.startup.elapsed().as_secs_f32()
    }
}

/// Counts frames and reports the rate once per reporting window.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: f32,
    accumulated: f32,
    frames: u32,
    last_fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl FpsCounter {
    pub fn new(window_seconds: f32) -> Self {
        Self {
            window: window_seconds.max(f32::EPSILON),
            accumulated: 0.0,
            frames: 0,
            last_fps: 0.0,
        }
    }

    /// Feeds one frame. Returns the frame rate when a window closes.
    pub fn tick(&mut self, delta_seconds: f32) -> Option<f32> {
        self.accumulated += delta_seconds;
        self.frames += 1;

        if self.accumulated < self.window {
            return None;
        }

        self.last_fps = self.frames as f32 / self.accumulated;
        self.accumulated = 0.0;
        self.frames = 0;
        log::debug!("{:.1} fps", self.last_fps);
        Some(self.last_fps)
    }

    pub fn last_fps(&self) -> f32 {
        self.last_fps
    }
}

/// Per-frame values handed explicitly to every pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub width: u32,
    pub height: u32,
    pub delta_seconds: f32,
}

impl FrameContext {
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_reports_once_per_window() {
        let mut fps = FpsCounter::new(1.0);
        for _ in 0..59 {
            assert!(fps.tick(1.0 / 60.0).is_none());
        }
        let rate = fps.tick(1.0 / 60.0 + 1e-4).unwrap();
        assert!((rate - 60.0).abs() < 0.1);
    }

    #[test]
    fn zero_height_aspect_is_one() {
        let ctx = FrameContext {
            width: 800,
            height: 0,
            delta_seconds: 0.0,
        };
        assert_eq!(ctx.aspect_ratio(), 1.0);
    }
}
