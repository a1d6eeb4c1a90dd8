//! Processed frame rate

use std::time::{Duration, Instant};

/// Counts frames and publishes a rate once per window
#[derive(Debug, Clone)]
pub struct FrameRateMeter {
    window: Duration,
    window_start: Instant,
    frames: u32,
    fps: f64,
}

impl FrameRateMeter {
    pub fn new(start: Instant) -> Self {
        Self::with_window(start, Duration::from_secs(1))
    }

    pub fn with_window(start: Instant, window: Duration) -> Self {
        Self {
            window,
            window_start: start,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Count one frame; returns the new rate when a window closes
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        self.fps = self.frames as f64 / elapsed.as_secs_f64();
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }

    /// Last published rate
    pub fn fps(&self) -> f64 {
        self.fps
    }
}
