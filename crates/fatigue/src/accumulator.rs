//! Debounced eye-closure and mouth-open event counting

use serde::{Deserialize, Serialize};

use crate::FatigueConfig;

/// Condition-true frames since the last scoring evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleCounters {
    pub eye: u32,
    pub mouth: u32,
}

impl CycleCounters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Confirmed events, lifetime and windowed.
///
/// Both pairs advance through the same `record_*` call; only their reset
/// entry points differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounters {
    pub total_eye_closed: u64,
    pub total_mouth_open: u64,
    pub thirty_sec_eye: u64,
    pub thirty_sec_mouth: u64,
}

impl EventCounters {
    fn record_eye_closure(&mut self) {
        self.total_eye_closed += 1;
        self.thirty_sec_eye += 1;
    }

    fn record_mouth_open(&mut self) {
        self.total_mouth_open += 1;
        self.thirty_sec_mouth += 1;
    }

    /// Zero the windowed pair only
    pub fn reset_window(&mut self) {
        self.thirty_sec_eye = 0;
        self.thirty_sec_mouth = 0;
    }

    /// Zero lifetime and windowed counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Events confirmed by a single `observe` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservedEvents {
    pub eye_closure: bool,
    pub mouth_open: bool,
}

/// Per-frame debounce and accumulation
#[derive(Debug, Clone)]
pub struct EventAccumulator {
    eye_ar_frames: u32,
    mar_thresh: f64,
    mouth_ar_frames: u32,

    /// Consecutive closed-eye frames in the current run
    eye_count: u32,
    /// Consecutive open-mouth frames in the current run
    mouth_counter: u32,

    cycle: CycleCounters,
    events: EventCounters,
}

impl EventAccumulator {
    pub fn new(config: &FatigueConfig) -> Self {
        Self {
            eye_ar_frames: config.eye_ar_frames,
            mar_thresh: config.mar_thresh,
            mouth_ar_frames: config.mouth_ar_frames,
            eye_count: 0,
            mouth_counter: 0,
            cycle: CycleCounters::default(),
            events: EventCounters::default(),
        }
    }

    /// Feed one frame's ratios against the current eye threshold.
    ///
    /// A closure (or yawn) is confirmed once per run, on the frame the
    /// condition ends, and only if the run reached the debounce length.
    pub fn observe(&mut self, ear: f64, mar: f64, eye_thresh: f64) -> ObservedEvents {
        let mut observed = ObservedEvents::default();

        if ear < eye_thresh {
            self.eye_count += 1;
            self.cycle.eye += 1;
        } else {
            if self.eye_count >= self.eye_ar_frames {
                self.events.record_eye_closure();
                observed.eye_closure = true;
            }
            self.eye_count = 0;
        }

        if mar > self.mar_thresh {
            self.mouth_counter += 1;
            self.cycle.mouth += 1;
        } else {
            if self.mouth_counter >= self.mouth_ar_frames {
                self.events.record_mouth_open();
                observed.mouth_open = true;
            }
            self.mouth_counter = 0;
        }

        observed
    }

    /// No face this frame: drop the cycle tally, keep runs and totals
    pub fn no_face(&mut self) {
        self.cycle.reset();
    }

    pub fn cycle(&self) -> CycleCounters {
        self.cycle
    }

    /// Mutable cycle counters, for the scorer to drain
    pub fn cycle_mut(&mut self) -> &mut CycleCounters {
        &mut self.cycle
    }

    pub fn events(&self) -> EventCounters {
        self.events
    }

    /// Current debounce run lengths `(eye, mouth)`
    pub fn runs(&self) -> (u32, u32) {
        (self.eye_count, self.mouth_counter)
    }

    /// Clear every counter: runs, cycle, lifetime and windowed
    pub fn reset_counts(&mut self) {
        self.eye_count = 0;
        self.mouth_counter = 0;
        self.cycle.reset();
        self.events.reset();
    }

    pub fn reset_window_counts(&mut self) {
        self.events.reset_window();
    }
}

impl Default for EventAccumulator {
    fn default() -> Self {
        Self::new(&FatigueConfig::default())
    }
}
