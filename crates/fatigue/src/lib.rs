//! Fatigue State Estimation
//!
//! Turns per-frame eye and mouth aspect ratios into a stable
//! normal / warning / fatigue classification:
//! - Adaptive eyes-closed threshold tracking the driver's EAR baseline
//! - Debounced eye-closure and yawn counting
//! - Weighted fatigue score every evaluation interval
//! - Latched state with a minimum dwell time
//! - Short hold on classifier behavior labels (phone, drink, smoke)

pub mod accumulator;
pub mod actions;
pub mod analysis;
pub mod config;
pub mod scorer;
pub mod signals;
pub mod state;
pub mod threshold;

pub use accumulator::{CycleCounters, EventAccumulator, EventCounters};
pub use actions::{ActionTracker, ActiveActions, Behavior};
pub use analysis::{FrameAnalysis, SessionSnapshot, SkipReason};
pub use config::FatigueConfig;
pub use scorer::FatigueScorer;
pub use signals::{ActionDetection, BoundingBox, FaceSignals, FrameSignals};
pub use state::{classify, FatigueState, FatigueStateMachine, Transition};
pub use threshold::ThresholdAdapter;

use signal_validator::{SignalValidator, ValidationConfig};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

/// Fatigue estimator error types
#[derive(Error, Debug)]
pub enum FatigueError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// One monitoring session: all detector state for a single camera run
pub struct FatigueSession {
    validator: SignalValidator,
    thresholds: ThresholdAdapter,
    accumulator: EventAccumulator,
    scorer: FatigueScorer,
    machine: FatigueStateMachine,
    actions: ActionTracker,
    last_score: Option<f64>,
    frames: u64,
}

impl FatigueSession {
    /// Create a session whose evaluation clock starts at `start`
    pub fn new(config: FatigueConfig, start: Instant) -> Result<Self, FatigueError> {
        Self::with_validation(config, ValidationConfig::default(), start)
    }

    /// Create a session with custom signal ranges
    pub fn with_validation(
        config: FatigueConfig,
        validation: ValidationConfig,
        start: Instant,
    ) -> Result<Self, FatigueError> {
        config.validate()?;
        info!(
            eye_thresh = config.initial_eye_thresh,
            fatigue_threshold = config.fatigue_threshold,
            warning_threshold = config.warning_threshold,
            latch_warning = config.latch_warning,
            "fatigue session created"
        );

        Ok(Self {
            validator: SignalValidator::new(validation),
            thresholds: ThresholdAdapter::new(&config),
            accumulator: EventAccumulator::new(&config),
            scorer: FatigueScorer::new(&config, start),
            machine: FatigueStateMachine::new(&config),
            actions: ActionTracker::new(&config),
            last_score: None,
            frames: 0,
        })
    }

    /// Process one analyzed frame observed at `now`
    pub fn process(&mut self, signals: &FrameSignals, now: Instant) -> FrameAnalysis {
        self.frames += 1;
        let actions = self.actions.update(&signals.actions);

        let skipped = match signals.face {
            None => {
                self.accumulator.no_face();
                Some(SkipReason::NoFace)
            }
            Some(FaceSignals { ear, mar }) => match self.validator.validate_ratios(ear, mar) {
                Ok(()) => {
                    self.observe(ear, mar);
                    None
                }
                Err(e) => {
                    warn!("Ignoring frame signal: {}", e);
                    Some(SkipReason::InvalidSignal)
                }
            },
        };

        let score = self.scorer.maybe_score(now, self.accumulator.cycle_mut());
        if let Some(score) = score {
            metrics::gauge!("fatigue_score").set(score);
            self.machine.on_score(score, now);
            self.last_score = Some(score);
        }

        let (state, transition) = self.machine.poll(now);
        if let Some(t) = &transition {
            info!(from = %t.from, to = %t.to, "fatigue state changed");
            metrics::counter!("fatigue_transitions_total", "to" => t.to.as_str()).increment(1);
        }

        FrameAnalysis {
            face_detected: signals.face_detected(),
            skipped,
            eye_thresh: self.thresholds.eye_thresh(),
            score,
            state,
            transition,
            counters: self.accumulator.events(),
            actions,
        }
    }

    fn observe(&mut self, ear: f64, mar: f64) {
        let eye_thresh = self.thresholds.update(ear);
        metrics::gauge!("fatigue_eye_threshold").set(eye_thresh);

        let observed = self.accumulator.observe(ear, mar, eye_thresh);
        if observed.eye_closure {
            metrics::counter!("fatigue_eye_closures_total").increment(1);
        }
        if observed.mouth_open {
            metrics::counter!("fatigue_mouth_openings_total").increment(1);
        }
    }

    /// Zero every event counter; thresholds and latches are kept
    pub fn reset_counts(&mut self) {
        info!("Resetting fatigue counters");
        self.accumulator.reset_counts();
    }

    /// Zero the windowed counters only
    pub fn reset_window_counts(&mut self) {
        self.accumulator.reset_window_counts();
    }

    /// State at `now`, without reporting a transition
    pub fn state_at(&self, now: Instant) -> FatigueState {
        self.machine.state_at(now)
    }

    pub fn eye_thresh(&self) -> f64 {
        self.thresholds.eye_thresh()
    }

    pub fn counters(&self) -> EventCounters {
        self.accumulator.events()
    }

    pub fn cycle(&self) -> CycleCounters {
        self.accumulator.cycle()
    }

    pub fn state_machine(&self) -> &FatigueStateMachine {
        &self.machine
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.machine.reported(),
            eye_thresh: self.thresholds.eye_thresh(),
            counters: self.accumulator.events(),
            actions: self.actions.active(),
            last_score: self.last_score,
            frames: self.frames,
        }
    }
}
