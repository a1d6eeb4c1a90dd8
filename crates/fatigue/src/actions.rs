//! Behavior label tracking (phone, drink, smoke)

use serde::{Deserialize, Serialize};

use crate::signals::ActionDetection;
use crate::FatigueConfig;

/// Behaviors the classifier can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    Phone,
    Drink,
    Smoke,
}

impl Behavior {
    /// Map a classifier label, `None` for labels the monitor does not track
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "phone" => Some(Self::Phone),
            "drink" => Some(Self::Drink),
            "smoke" => Some(Self::Smoke),
            _ => None,
        }
    }
}

/// Which behaviors are currently raised
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveActions {
    pub phone: bool,
    pub drink: bool,
    pub smoke: bool,
}

impl ActiveActions {
    fn raise(&mut self, behavior: Behavior) {
        match behavior {
            Behavior::Phone => self.phone = true,
            Behavior::Drink => self.drink = true,
            Behavior::Smoke => self.smoke = true,
        }
    }

    pub fn any(&self) -> bool {
        self.phone || self.drink || self.smoke
    }
}

/// Holds detected behaviors for a few frames so one-frame misses from the
/// classifier do not make the display flicker.
///
/// A single countdown is shared by all behaviors: any tracked detection
/// restarts it, and when it runs out every flag drops together.
#[derive(Debug, Clone)]
pub struct ActionTracker {
    hold_frames: u32,
    min_confidence: f64,
    remaining: u32,
    active: ActiveActions,
}

impl ActionTracker {
    pub fn new(config: &FatigueConfig) -> Self {
        Self {
            hold_frames: config.action_hold_frames,
            min_confidence: config.action_min_confidence,
            remaining: 0,
            active: ActiveActions::default(),
        }
    }

    /// Update with this frame's detections
    pub fn update(&mut self, detections: &[ActionDetection]) -> ActiveActions {
        self.remaining = self.remaining.saturating_sub(1);

        for detection in detections {
            if detection.confidence < self.min_confidence {
                continue;
            }
            if let Some(behavior) = Behavior::from_label(&detection.label) {
                self.active.raise(behavior);
                self.remaining = self.hold_frames;
            }
        }

        if self.remaining == 0 {
            self.active = ActiveActions::default();
        }
        self.active
    }

    pub fn active(&self) -> ActiveActions {
        self.active
    }
}

impl Default for ActionTracker {
    fn default() -> Self {
        Self::new(&FatigueConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone() -> Vec<ActionDetection> {
        vec![ActionDetection::new("phone", 0.9)]
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(Behavior::from_label("Phone"), Some(Behavior::Phone));
        assert_eq!(Behavior::from_label(" smoke "), Some(Behavior::Smoke));
        assert_eq!(Behavior::from_label("face"), None);
    }

    #[test]
    fn test_held_for_hold_frames() {
        let mut tracker = ActionTracker::default();
        assert!(tracker.update(&phone()).phone);

        // detection frame plus four quiet frames
        for _ in 0..4 {
            assert!(tracker.update(&[]).phone);
        }
        assert!(!tracker.update(&[]).phone);
    }

    #[test]
    fn test_new_detection_restarts_hold_for_all() {
        let mut tracker = ActionTracker::default();
        tracker.update(&phone());
        tracker.update(&[]);
        tracker.update(&[]);

        let active = tracker.update(&[ActionDetection::new("drink", 0.8)]);
        assert!(active.phone && active.drink);

        for _ in 0..4 {
            tracker.update(&[]);
        }
        let active = tracker.update(&[]);
        assert!(!active.any());
    }

    #[test]
    fn test_unknown_and_weak_detections_ignored() {
        let mut tracker = ActionTracker::new(&FatigueConfig {
            action_min_confidence: 0.5,
            ..Default::default()
        });
        assert!(!tracker.update(&[ActionDetection::new("seatbelt", 0.99)]).any());
        assert!(!tracker.update(&[ActionDetection::new("smoke", 0.3)]).any());
        assert!(tracker.update(&[ActionDetection::new("smoke", 0.6)]).smoke);
    }
}
