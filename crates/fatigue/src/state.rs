//! Latched fatigue state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::FatigueConfig;

/// Externally visible fatigue classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FatigueState {
    #[default]
    Normal,
    Warning,
    Fatigue,
}

impl FatigueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Fatigue => "fatigue",
        }
    }
}

impl fmt::Display for FatigueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change of reported state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: FatigueState,
    pub to: FatigueState,
    pub at: Instant,
}

/// Derive the state from latch timestamps.
///
/// `Fatigue` while `now` is within `maintain` of the fatigue latch, else
/// `Warning` within `maintain` of the warning latch, else `Normal`.
pub fn classify(
    now: Instant,
    last_fatigue_time: Option<Instant>,
    last_warning_time: Option<Instant>,
    maintain: Duration,
) -> FatigueState {
    let held = |latch: Option<Instant>| {
        latch.is_some_and(|t| now.saturating_duration_since(t) < maintain)
    };

    if held(last_fatigue_time) {
        FatigueState::Fatigue
    } else if held(last_warning_time) {
        FatigueState::Warning
    } else {
        FatigueState::Normal
    }
}

/// Score-driven latches plus transition reporting
#[derive(Debug, Clone)]
pub struct FatigueStateMachine {
    fatigue_threshold: f64,
    warning_threshold: f64,
    maintain: Duration,
    latch_warning: bool,
    last_fatigue_time: Option<Instant>,
    last_warning_time: Option<Instant>,
    reported: FatigueState,
}

impl FatigueStateMachine {
    pub fn new(config: &FatigueConfig) -> Self {
        Self {
            fatigue_threshold: config.fatigue_threshold,
            warning_threshold: config.warning_threshold,
            maintain: config.maintain_duration(),
            latch_warning: config.latch_warning,
            last_fatigue_time: None,
            last_warning_time: None,
            reported: FatigueState::Normal,
        }
    }

    /// Update latches from a freshly computed score
    pub fn on_score(&mut self, score: f64, now: Instant) {
        if score > self.fatigue_threshold {
            info!(score, "fatigue condition detected");
            self.last_fatigue_time = Some(now);
        } else if score > self.warning_threshold {
            info!(score, "warning condition detected");
            if self.latch_warning {
                self.last_warning_time = Some(now);
            }
        } else {
            debug!(score, "score below warning threshold");
        }
    }

    /// State at `now`, without touching the reported state
    pub fn state_at(&self, now: Instant) -> FatigueState {
        classify(now, self.last_fatigue_time, self.last_warning_time, self.maintain)
    }

    /// Recompute the state and report a transition if it differs from
    /// the last reported one
    pub fn poll(&mut self, now: Instant) -> (FatigueState, Option<Transition>) {
        let state = self.state_at(now);
        if state == self.reported {
            return (state, None);
        }

        let transition = Transition {
            from: self.reported,
            to: state,
            at: now,
        };
        self.reported = state;
        (state, Some(transition))
    }

    pub fn reported(&self) -> FatigueState {
        self.reported
    }

    pub fn last_fatigue_time(&self) -> Option<Instant> {
        self.last_fatigue_time
    }

    pub fn last_warning_time(&self) -> Option<Instant> {
        self.last_warning_time
    }
}

impl Default for FatigueStateMachine {
    fn default() -> Self {
        Self::new(&FatigueConfig::default())
    }
}
