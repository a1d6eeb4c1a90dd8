//! Periodic fatigue scoring

use std::time::{Duration, Instant};
use tracing::debug;

use crate::accumulator::CycleCounters;
use crate::FatigueConfig;

/// Weighted eye/mouth score computed on a fixed wall-clock cadence
#[derive(Debug, Clone)]
pub struct FatigueScorer {
    check_interval: Duration,
    min_interval_secs: f64,
    nominal_fps: f64,
    eye_weight: f64,
    mouth_weight: f64,
    last_check_time: Instant,
}

impl FatigueScorer {
    pub fn new(config: &FatigueConfig, start: Instant) -> Self {
        Self {
            check_interval: config.check_interval(),
            min_interval_secs: config.min_interval_secs,
            nominal_fps: config.nominal_fps,
            eye_weight: config.eye_weight,
            mouth_weight: config.mouth_weight,
            last_check_time: start,
        }
    }

    /// Score the cycle if an evaluation is due, draining `cycle` when it is.
    pub fn maybe_score(&mut self, now: Instant, cycle: &mut CycleCounters) -> Option<f64> {
        // A `now` earlier than the last check saturates to zero and is not due
        let elapsed = now.saturating_duration_since(self.last_check_time);
        if elapsed < self.check_interval {
            return None;
        }

        let interval = elapsed.as_secs_f64().max(self.min_interval_secs);
        let score = self.score(cycle.eye, cycle.mouth, interval);
        debug!(
            eye_frames = cycle.eye,
            mouth_frames = cycle.mouth,
            interval_secs = interval,
            score,
            "fatigue score evaluated"
        );

        cycle.reset();
        self.last_check_time = now;
        Some(score)
    }

    /// Score for given cycle counts over `interval_secs`
    pub fn score(&self, eye_frames: u32, mouth_frames: u32, interval_secs: f64) -> f64 {
        let est_frames = (interval_secs * self.nominal_fps).max(1.0);
        let eye_ratio = (eye_frames as f64 / est_frames).min(1.0);
        let mouth_ratio = (mouth_frames as f64 / est_frames).min(1.0);
        self.eye_weight * eye_ratio + self.mouth_weight * mouth_ratio
    }

    pub fn last_check_time(&self) -> Instant {
        self.last_check_time
    }
}
