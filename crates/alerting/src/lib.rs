//! Alerting System
//!
//! Starts an audible alert when the driver enters the fatigue state, never
//! overlapping two playbacks.

mod dispatcher;
mod player;

pub use dispatcher::AlertDispatcher;
pub use player::{AlertConfig, AlertPlayer, CommandPlayer, ConfiguredPlayer, LogPlayer};

use std::time::Duration;
use thiserror::Error;

/// Alert playback error types
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Failed to launch player: {0}")]
    Launch(#[from] std::io::Error),

    #[error("Player exited unsuccessfully: {0}")]
    Playback(String),

    #[error("Playback timed out after {0:?}")]
    Timeout(Duration),
}
