//! Per-frame inputs from the landmark extractor and behavior classifier

use serde::{Deserialize, Serialize};

/// Landmark ratios for a detected face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceSignals {
    /// Eye aspect ratio, averaged over both eyes
    pub ear: f64,
    /// Mouth aspect ratio
    pub mar: f64,
}

/// Detection box in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// One behavior classifier hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDetection {
    pub label: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl ActionDetection {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox: None,
        }
    }
}

/// Everything the external collaborators report for one analyzed frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSignals {
    /// `None` when no face was detected
    #[serde(default)]
    pub face: Option<FaceSignals>,
    #[serde(default)]
    pub actions: Vec<ActionDetection>,
}

impl FrameSignals {
    /// Frame with a detected face and no behavior hits
    pub fn face(ear: f64, mar: f64) -> Self {
        Self {
            face: Some(FaceSignals { ear, mar }),
            actions: Vec::new(),
        }
    }

    /// Frame where the landmark extractor found no face
    pub fn no_face() -> Self {
        Self::default()
    }

    pub fn with_action(mut self, action: ActionDetection) -> Self {
        self.actions.push(action);
        self
    }

    pub fn face_detected(&self) -> bool {
        self.face.is_some()
    }
}
