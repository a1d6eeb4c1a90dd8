//! Fatigue Monitor Host
//!
//! Owns the frame loop around a `FatigueSession`: pulls frame signals from a
//! source every tick, forwards transitions to the alert dispatcher and takes
//! operator commands between frames.

pub mod config;
pub mod fps;
pub mod runner;
pub mod source;

pub use config::MonitorConfig;
pub use fps::FrameRateMeter;
pub use runner::{Monitor, MonitorCommand, RunSummary, StopReason};
pub use source::{ReplaySource, SignalSource, SourceError};

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Fatigue(#[from] fatigue::FatigueError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("No signal source configured (set replay_path)")]
    NoSource,

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("Failed to start metrics exporter: {0}")]
    Metrics(String),
}

/// Initialize logging
pub fn init_logging(level: &str, json: bool) -> Result<(), MonitorError> {
    let level = Level::from_str(level)
        .map_err(|_| MonitorError::InvalidConfig(format!("unknown log level: {level}")))?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.map_err(|e| MonitorError::Logging(e.to_string()))
}

/// Serve Prometheus metrics on `addr`
pub fn init_metrics(addr: SocketAddr) -> Result<(), MonitorError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MonitorError::Metrics(e.to_string()))?;
    info!("Serving metrics on {}", addr);
    Ok(())
}

/// Forward operator commands typed on stdin
pub fn spawn_stdin_commands(tx: mpsc::Sender<MonitorCommand>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match line.parse::<MonitorCommand>() {
                    Ok(command) => {
                        if tx.send(command).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("{} (try reset, reset-window, status, quit)", e),
                },
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });
}

/// Send `Quit` on Ctrl-C
pub fn spawn_ctrl_c(tx: mpsc::Sender<MonitorCommand>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                let _ = tx.send(MonitorCommand::Quit).await;
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}
