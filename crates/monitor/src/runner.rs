//! Periodic frame loop

use alerting::{AlertDispatcher, AlertPlayer};
use chrono::{DateTime, Utc};
use fatigue::{FatigueSession, FrameSignals, SessionSnapshot};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::fps::FrameRateMeter;
use crate::source::{SignalSource, SourceError};
use crate::MonitorError;

/// Operator commands applied between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorCommand {
    /// Zero lifetime and windowed counters
    ResetCounts,
    /// Zero windowed counters only
    ResetWindow,
    /// Log the current snapshot
    Status,
    /// Stop the loop, aborting any alert playback
    Quit,
}

impl FromStr for MonitorCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reset" | "r" => Ok(Self::ResetCounts),
            "reset-window" | "w" => Ok(Self::ResetWindow),
            "status" | "s" => Ok(Self::Status),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    SourceExhausted,
    Quit,
}

/// Outcome of a monitoring run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub stop_reason: StopReason,
    pub transitions: u64,
    pub alerts_started: u64,
    pub skipped_records: u64,
    pub snapshot: SessionSnapshot,
}

/// Drives one session from a signal source at a fixed tick
pub struct Monitor<S, P> {
    session: FatigueSession,
    source: S,
    dispatcher: AlertDispatcher<P>,
    meter: FrameRateMeter,
    tick: Duration,
    status_interval: Option<Duration>,
    last_status: Instant,
    transitions: u64,
    skipped_records: u64,
}

/// Session clock; follows tokio's clock so paused-time tests advance it
pub fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

impl<S: SignalSource, P: AlertPlayer> Monitor<S, P> {
    pub fn new(
        session: FatigueSession,
        source: S,
        dispatcher: AlertDispatcher<P>,
        tick: Duration,
        status_interval: Option<Duration>,
    ) -> Self {
        let start = now();
        Self {
            session,
            source,
            dispatcher,
            meter: FrameRateMeter::new(start),
            tick,
            status_interval,
            last_status: start,
            transitions: 0,
            skipped_records: 0,
        }
    }

    /// Run until the source ends or a `Quit` command arrives
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<MonitorCommand>,
    ) -> Result<RunSummary, MonitorError> {
        let started_at = Utc::now();
        info!("Starting frame loop at {:?} per tick", self.tick);

        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut commands_open = true;

        let stop_reason = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.source.next_frame().await {
                        Ok(Some(frame)) => self.step(&frame, now()),
                        Ok(None) => {
                            info!("Signal source exhausted");
                            // let a running alert finish
                            self.dispatcher.wait_idle().await;
                            break StopReason::SourceExhausted;
                        }
                        Err(e @ SourceError::Parse { .. }) => {
                            warn!("Skipping record: {}", e);
                            self.skipped_records += 1;
                        }
                        Err(e) => {
                            self.dispatcher.shutdown().await;
                            return Err(e.into());
                        }
                    }
                }
                command = commands.recv(), if commands_open => {
                    match command {
                        Some(MonitorCommand::Quit) => {
                            info!("Quit requested");
                            self.dispatcher.shutdown().await;
                            break StopReason::Quit;
                        }
                        Some(command) => self.apply(command),
                        None => {
                            debug!("Command channel closed");
                            commands_open = false;
                        }
                    }
                }
            }
        };

        let summary = RunSummary {
            started_at,
            stop_reason,
            transitions: self.transitions,
            alerts_started: self.dispatcher.started(),
            skipped_records: self.skipped_records,
            snapshot: self.session.snapshot(),
        };
        info!(
            ?stop_reason,
            frames = summary.snapshot.frames,
            transitions = summary.transitions,
            alerts = summary.alerts_started,
            "Frame loop stopped"
        );
        Ok(summary)
    }

    /// Process one frame observed at `now`
    pub fn step(&mut self, frame: &FrameSignals, now: Instant) {
        let analysis = self.session.process(frame, now);

        if let Some(fps) = self.meter.tick(now) {
            metrics::gauge!("fatigue_frame_rate").set(fps);
            debug!(fps, "frame rate");
        }

        if let Some(transition) = analysis.transition {
            self.transitions += 1;
            self.dispatcher.on_transition(&transition);
        }

        if let Some(interval) = self.status_interval {
            if now.saturating_duration_since(self.last_status) >= interval {
                self.last_status = now;
                self.log_status();
            }
        }
    }

    /// Apply an operator command other than `Quit`
    pub fn apply(&mut self, command: MonitorCommand) {
        match command {
            MonitorCommand::ResetCounts => self.session.reset_counts(),
            MonitorCommand::ResetWindow => {
                info!("Resetting windowed counters");
                self.session.reset_window_counts();
            }
            MonitorCommand::Status => self.log_status(),
            MonitorCommand::Quit => {}
        }
    }

    fn log_status(&self) {
        match serde_json::to_string(&self.session.snapshot()) {
            Ok(json) => info!(fps = self.meter.fps(), status = %json, "status"),
            Err(e) => warn!("Failed to serialize status: {}", e),
        }
    }

    pub fn session(&self) -> &FatigueSession {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ReplaySource;
    use alerting::LogPlayer;
    use fatigue::{FatigueConfig, FatigueState};
    use std::io::Cursor;
    use tokio::runtime::Handle;

    fn replay(lines: &[&str]) -> ReplaySource<Cursor<String>> {
        ReplaySource::new(Cursor::new(lines.join("\n")))
    }

    fn monitor(source: ReplaySource<Cursor<String>>) -> Monitor<ReplaySource<Cursor<String>>, LogPlayer> {
        let session = FatigueSession::new(FatigueConfig::default(), now()).unwrap();
        let dispatcher = AlertDispatcher::new(LogPlayer, Handle::current());
        Monitor::new(session, source, dispatcher, Duration::from_millis(20), None)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("reset".parse(), Ok(MonitorCommand::ResetCounts));
        assert_eq!(" Q ".parse(), Ok(MonitorCommand::Quit));
        assert_eq!("w".parse(), Ok(MonitorCommand::ResetWindow));
        assert!("dance".parse::<MonitorCommand>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drowsy_replay_raises_alert() {
        let closed = r#"{"face":{"ear":0.1,"mar":0.3}}"#;
        let lines = vec![closed; 150];
        let (_tx, rx) = mpsc::channel(4);

        let summary = monitor(replay(&lines)).run(rx).await.unwrap();

        assert_eq!(summary.stop_reason, StopReason::SourceExhausted);
        assert_eq!(summary.snapshot.frames, 150);
        assert_eq!(summary.snapshot.state, FatigueState::Fatigue);
        assert_eq!(summary.transitions, 1);
        assert_eq!(summary.alerts_started, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_records_skipped() {
        let lines = [r#"{"face":{"ear":0.3,"mar":0.3}}"#, "not json", r#"{}"#];
        let (_tx, rx) = mpsc::channel(4);

        let summary = monitor(replay(&lines)).run(rx).await.unwrap();
        assert_eq!(summary.skipped_records, 1);
        assert_eq!(summary.snapshot.frames, 2);
        assert_eq!(summary.snapshot.state, FatigueState::Normal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_command_stops_loop() {
        let open = r#"{"face":{"ear":0.3,"mar":0.3}}"#;
        let lines = vec![open; 1000];
        let (tx, rx) = mpsc::channel(4);
        tx.send(MonitorCommand::Quit).await.unwrap();

        let summary = monitor(replay(&lines)).run(rx).await.unwrap();
        assert_eq!(summary.stop_reason, StopReason::Quit);
        assert!(summary.snapshot.frames < 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_command_clears_counters() {
        let mut monitor = monitor(replay(&[]));
        let start = now();
        for (i, ear) in [0.1, 0.1, 0.3].into_iter().enumerate() {
            monitor.step(&FrameSignals::face(ear, 0.3), start + Duration::from_millis(20 * i as u64));
        }
        assert_eq!(monitor.session().counters().total_eye_closed, 1);

        monitor.apply(MonitorCommand::ResetWindow);
        assert_eq!(monitor.session().counters().thirty_sec_eye, 0);
        assert_eq!(monitor.session().counters().total_eye_closed, 1);

        monitor.apply(MonitorCommand::ResetCounts);
        assert_eq!(monitor.session().counters().total_eye_closed, 0);
    }
}
