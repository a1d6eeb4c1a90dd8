//! Fatigue estimator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::FatigueError;

/// Upper bound accepted for the scoring cadence and the latch hold (one day)
pub const MAX_DURATION_SECS: f64 = 86_400.0;

/// Fatigue estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    /// Starting eyes-closed EAR threshold
    pub initial_eye_thresh: f64,
    /// Lower clamp for the adaptive threshold
    pub min_eye_thresh: f64,
    /// Upper clamp for the adaptive threshold
    pub max_eye_thresh: f64,
    /// Fixed step applied per threshold adjustment
    pub eye_adjust_step: f64,
    /// Half-width of the deadband around the threshold
    pub eye_deadband: f64,
    /// Number of recent EAR samples averaged for adaptation
    pub eye_window: usize,

    /// Consecutive closed frames that make one closure event
    pub eye_ar_frames: u32,
    /// MAR above which the mouth counts as open
    pub mar_thresh: f64,
    /// Consecutive open frames that make one yawn event
    pub mouth_ar_frames: u32,

    /// Scoring cadence (seconds)
    pub check_interval_secs: f64,
    /// Lower clamp on the measured scoring interval (seconds)
    pub min_interval_secs: f64,
    /// Nominal analysis rate used to estimate frames per interval
    pub nominal_fps: f64,
    /// Weight of the eye-closure ratio in the score
    pub eye_weight: f64,
    /// Weight of the mouth-open ratio in the score
    pub mouth_weight: f64,

    /// Score above which the fatigue latch is set
    pub fatigue_threshold: f64,
    /// Score above which the warning latch is set
    pub warning_threshold: f64,
    /// How long a latched state is held (seconds)
    pub maintain_secs: f64,
    /// Set the warning latch on warning-level scores.
    /// `false` reproduces deployments where warning was only ever logged.
    pub latch_warning: bool,

    /// Frames a detected behavior label stays raised
    pub action_hold_frames: u32,
    /// Detections below this confidence are ignored
    pub action_min_confidence: f64,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            initial_eye_thresh: 0.26,
            min_eye_thresh: 0.15,
            max_eye_thresh: 0.35,
            eye_adjust_step: 0.05,
            eye_deadband: 0.1,
            eye_window: 30,
            eye_ar_frames: 2,
            mar_thresh: 0.65,
            mouth_ar_frames: 3,
            check_interval_secs: 2.0,
            min_interval_secs: 0.1,
            nominal_fps: 30.0,
            eye_weight: 0.8,
            mouth_weight: 0.2,
            fatigue_threshold: 0.30,
            warning_threshold: 0.15,
            maintain_secs: 30.0,
            latch_warning: true,
            action_hold_frames: 5,
            action_min_confidence: 0.0,
        }
    }
}

impl FatigueConfig {
    /// Create strict config (lower score thresholds)
    pub fn strict() -> Self {
        Self {
            fatigue_threshold: 0.20,
            warning_threshold: 0.10,
            ..Default::default()
        }
    }

    /// Create lenient config (higher score thresholds)
    pub fn lenient() -> Self {
        Self {
            fatigue_threshold: 0.45,
            warning_threshold: 0.25,
            ..Default::default()
        }
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs_f64(self.check_interval_secs)
    }

    pub fn maintain_duration(&self) -> Duration {
        Duration::from_secs_f64(self.maintain_secs)
    }

    fn float_fields(&self) -> [(&'static str, f64); 15] {
        [
            ("initial_eye_thresh", self.initial_eye_thresh),
            ("min_eye_thresh", self.min_eye_thresh),
            ("max_eye_thresh", self.max_eye_thresh),
            ("eye_adjust_step", self.eye_adjust_step),
            ("eye_deadband", self.eye_deadband),
            ("mar_thresh", self.mar_thresh),
            ("check_interval_secs", self.check_interval_secs),
            ("min_interval_secs", self.min_interval_secs),
            ("nominal_fps", self.nominal_fps),
            ("eye_weight", self.eye_weight),
            ("mouth_weight", self.mouth_weight),
            ("fatigue_threshold", self.fatigue_threshold),
            ("warning_threshold", self.warning_threshold),
            ("maintain_secs", self.maintain_secs),
            ("action_min_confidence", self.action_min_confidence),
        ]
    }

    /// Reject configurations that would break the estimator invariants
    pub fn validate(&self) -> Result<(), FatigueError> {
        if let Some((field, value)) = self.float_fields().into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(FatigueError::Config(format!("{field} must be finite, got {value}")));
        }
        if self.min_eye_thresh > self.max_eye_thresh {
            return Err(FatigueError::Config(format!(
                "min_eye_thresh {} exceeds max_eye_thresh {}",
                self.min_eye_thresh, self.max_eye_thresh
            )));
        }
        if !(self.min_eye_thresh..=self.max_eye_thresh).contains(&self.initial_eye_thresh) {
            return Err(FatigueError::Config(format!(
                "initial_eye_thresh {} outside [{}, {}]",
                self.initial_eye_thresh, self.min_eye_thresh, self.max_eye_thresh
            )));
        }
        if self.eye_adjust_step <= 0.0 || self.eye_deadband < 0.0 {
            return Err(FatigueError::Config(
                "eye_adjust_step must be positive and eye_deadband non-negative".into(),
            ));
        }
        if self.eye_window == 0 {
            return Err(FatigueError::Config("eye_window must be at least 1".into()));
        }
        if self.check_interval_secs <= 0.0 || self.min_interval_secs <= 0.0 {
            return Err(FatigueError::Config(
                "check_interval_secs and min_interval_secs must be positive".into(),
            ));
        }
        if self.nominal_fps <= 0.0 {
            return Err(FatigueError::Config("nominal_fps must be positive".into()));
        }
        if (self.eye_weight + self.mouth_weight - 1.0).abs() > 1e-6 {
            return Err(FatigueError::Config(format!(
                "eye_weight + mouth_weight must equal 1.0, got {}",
                self.eye_weight + self.mouth_weight
            )));
        }
        if self.warning_threshold > self.fatigue_threshold {
            return Err(FatigueError::Config(format!(
                "warning_threshold {} exceeds fatigue_threshold {}",
                self.warning_threshold, self.fatigue_threshold
            )));
        }
        if self.maintain_secs < 0.0 {
            return Err(FatigueError::Config("maintain_secs must be non-negative".into()));
        }
        if self.check_interval_secs > MAX_DURATION_SECS || self.maintain_secs > MAX_DURATION_SECS {
            return Err(FatigueError::Config(format!(
                "check_interval_secs and maintain_secs must not exceed {MAX_DURATION_SECS}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(FatigueConfig::default().validate().is_ok());
        assert!(FatigueConfig::strict().validate().is_ok());
        assert!(FatigueConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_inverted_clamp_rejected() {
        let config = FatigueConfig {
            min_eye_thresh: 0.4,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FatigueError::Config(_))));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let config = FatigueConfig {
            mouth_weight: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let infinite_hold = FatigueConfig {
            maintain_secs: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(infinite_hold.validate(), Err(FatigueError::Config(_))));

        let nan_interval = FatigueConfig {
            check_interval_secs: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(nan_interval.validate(), Err(FatigueError::Config(_))));

        let nan_weight = FatigueConfig {
            eye_weight: f64::NAN,
            ..Default::default()
        };
        assert!(nan_weight.validate().is_err());
    }

    #[test]
    fn test_oversized_durations_rejected() {
        let config = FatigueConfig {
            maintain_secs: 1e30,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FatigueConfig {
            check_interval_secs: MAX_DURATION_SECS,
            maintain_secs: MAX_DURATION_SECS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.maintain_duration(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: FatigueConfig =
            serde_json::from_str(r#"{"fatigue_threshold": 0.4, "latch_warning": false}"#).unwrap();
        assert_eq!(config.fatigue_threshold, 0.4);
        assert!(!config.latch_warning);
        assert_eq!(config.eye_window, 30);
        assert_eq!(config.check_interval(), Duration::from_secs(2));
    }
}
