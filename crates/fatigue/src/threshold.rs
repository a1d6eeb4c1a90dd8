//! Adaptive eyes-closed threshold

use ring_buffer::RingBuffer;
use tracing::debug;

use crate::FatigueConfig;

/// Tracks the recent EAR baseline and nudges the eyes-closed threshold
/// toward it in fixed steps, clamped to `[min_eye_thresh, max_eye_thresh]`.
#[derive(Debug, Clone)]
pub struct ThresholdAdapter {
    eye_thresh: f64,
    window: RingBuffer<f64>,
    step: f64,
    deadband: f64,
    min: f64,
    max: f64,
}

impl ThresholdAdapter {
    pub fn new(config: &FatigueConfig) -> Self {
        Self {
            eye_thresh: config
                .initial_eye_thresh
                .clamp(config.min_eye_thresh, config.max_eye_thresh),
            window: RingBuffer::new(config.eye_window),
            step: config.eye_adjust_step,
            deadband: config.eye_deadband,
            min: config.min_eye_thresh,
            max: config.max_eye_thresh,
        }
    }

    /// Record one EAR sample and return the (possibly adjusted) threshold.
    ///
    /// The threshold only moves once the window is full, and by at most one
    /// step per call.
    pub fn update(&mut self, ear: f64) -> f64 {
        self.window.push(ear);
        if !self.window.is_full() {
            return self.eye_thresh;
        }

        if let Some(mean) = self.window.mean() {
            let previous = self.eye_thresh;
            if mean < self.eye_thresh - self.deadband {
                self.eye_thresh = (self.eye_thresh - self.step).max(self.min);
            } else if mean > self.eye_thresh + self.deadband {
                self.eye_thresh = (self.eye_thresh + self.step).min(self.max);
            }
            if self.eye_thresh != previous {
                debug!(
                    mean,
                    from = previous,
                    to = self.eye_thresh,
                    "eye threshold adjusted"
                );
            }
        }

        self.eye_thresh
    }

    /// Current threshold
    pub fn eye_thresh(&self) -> f64 {
        self.eye_thresh
    }

    /// Number of samples in the adaptation window
    pub fn samples(&self) -> usize {
        self.window.len()
    }
}

impl Default for ThresholdAdapter {
    fn default() -> Self {
        Self::new(&FatigueConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unchanged_below_capacity() {
        let mut adapter = ThresholdAdapter::default();
        for _ in 0..29 {
            assert_eq!(adapter.update(0.0), 0.26);
        }
        assert_eq!(adapter.samples(), 29);
    }

    #[test]
    fn test_low_baseline_steps_down_until_clamped() {
        let mut adapter = ThresholdAdapter::default();
        let mut last = adapter.eye_thresh();
        for _ in 0..29 {
            adapter.update(0.05);
        }

        // 30th sample fills the window: 0.05 < 0.26 - 0.1
        let next = adapter.update(0.05);
        assert!(next < last);
        assert!((next - 0.21).abs() < 1e-9);
        last = next;

        // 0.05 < 0.21 - 0.1, one more step then clamped at 0.15
        let next = adapter.update(0.05);
        assert!(next < last);
        assert!((next - 0.16).abs() < 1e-9);
        assert!((adapter.update(0.05) - 0.15).abs() < 1e-9);
        assert!((adapter.update(0.05) - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_high_baseline_steps_up_until_clamped() {
        let mut adapter = ThresholdAdapter::default();
        for _ in 0..40 {
            adapter.update(0.9);
        }
        assert!((adapter.eye_thresh() - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_deadband_holds_threshold() {
        let mut adapter = ThresholdAdapter::default();
        for _ in 0..100 {
            // within 0.26 +/- 0.1
            adapter.update(0.30);
        }
        assert_eq!(adapter.eye_thresh(), 0.26);
    }

    proptest! {
        #[test]
        fn threshold_stays_in_bounds(samples in proptest::collection::vec(0.0f64..1.2, 0..300)) {
            let mut adapter = ThresholdAdapter::default();
            for ear in samples {
                let before = adapter.eye_thresh();
                let thresh = adapter.update(ear);
                prop_assert!((0.15..=0.35).contains(&thresh));
                // bounded step, never a jump
                prop_assert!((thresh - before).abs() <= 0.05 + 1e-9);
            }
        }
    }
}
