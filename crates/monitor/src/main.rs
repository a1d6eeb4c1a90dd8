//! Fatigue Monitor - Main Entry Point

use alerting::{AlertDispatcher, ConfiguredPlayer};
use anyhow::Context;
use fatigue::FatigueSession;
use monitor::{
    init_logging, init_metrics, runner, spawn_ctrl_c, spawn_stdin_commands, Monitor, MonitorConfig,
    MonitorError, ReplaySource,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = MonitorConfig::load().context("loading monitor configuration")?;
    init_logging(&config.log_level, config.log_json)?;

    info!("=== Fatigue Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    if let Some(addr) = config.metrics_addr {
        init_metrics(addr)?;
    }

    let replay_path = config.replay_path.as_ref().ok_or(MonitorError::NoSource)?;
    let source = ReplaySource::open(replay_path)
        .await
        .with_context(|| format!("opening {}", replay_path.display()))?;

    let session = FatigueSession::with_validation(
        config.fatigue.clone(),
        config.validation.clone(),
        runner::now(),
    )?;
    let dispatcher = AlertDispatcher::new(ConfiguredPlayer::from_config(&config.alert), Handle::current());
    let monitor = Monitor::new(session, source, dispatcher, config.tick(), config.status_interval());

    let (tx, rx) = mpsc::channel(16);
    spawn_stdin_commands(tx.clone());
    spawn_ctrl_c(tx);

    let span = info_span!("session", id = %Uuid::new_v4());
    let summary = monitor.run(rx).instrument(span).await?;

    info!(
        started_at = %summary.started_at,
        state = %summary.snapshot.state,
        total_eye_closed = summary.snapshot.counters.total_eye_closed,
        total_mouth_open = summary.snapshot.counters.total_mouth_open,
        "Session finished"
    );
    Ok(())
}
