//! Per-frame analysis results

use serde::{Deserialize, Serialize};

use crate::accumulator::EventCounters;
use crate::actions::ActiveActions;
use crate::state::{FatigueState, Transition};

/// Why a frame contributed no eye/mouth observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Landmark extractor found no face
    NoFace,
    /// Ratios were NaN, infinite or out of range
    InvalidSignal,
}

/// Result of processing one frame
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    /// Whether a face was detected
    pub face_detected: bool,

    /// Set when the eye/mouth branches were skipped
    pub skipped: Option<SkipReason>,

    /// Eyes-closed threshold in effect after this frame
    pub eye_thresh: f64,

    /// Score, if an evaluation ran this frame
    pub score: Option<f64>,

    /// Current fatigue state
    pub state: FatigueState,

    /// Set on the frame the reported state changed
    pub transition: Option<Transition>,

    /// Confirmed event totals
    pub counters: EventCounters,

    /// Behaviors currently raised
    pub actions: ActiveActions,
}

/// Display-oriented view of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: FatigueState,
    pub eye_thresh: f64,
    #[serde(flatten)]
    pub counters: EventCounters,
    pub actions: ActiveActions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_score: Option<f64>,
    pub frames: u64,
}
