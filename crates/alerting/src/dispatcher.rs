//! Alert Dispatcher Implementation

use fatigue::{FatigueState, Transition};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::player::AlertPlayer;

/// Clears the in-flight flag when the playback task ends, whether it
/// completed, failed, panicked or was aborted.
struct PlaybackGuard(Arc<AtomicBool>);

impl Drop for PlaybackGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Starts at most one alert playback at a time on transitions into fatigue
pub struct AlertDispatcher<P> {
    player: Arc<P>,
    /// Shared with the playback task
    playing: Arc<AtomicBool>,
    runtime: Handle,
    in_flight: Option<JoinHandle<()>>,
    started: u64,
}

impl<P: AlertPlayer> AlertDispatcher<P> {
    /// Create a dispatcher spawning playback onto `runtime`
    pub fn new(player: P, runtime: Handle) -> Self {
        Self {
            player: Arc::new(player),
            playing: Arc::new(AtomicBool::new(false)),
            runtime,
            in_flight: None,
            started: 0,
        }
    }

    /// React to a state transition. Returns true if a playback was started.
    ///
    /// Only entering `Fatigue` starts playback; leaving it does not touch the
    /// in-flight flag, which belongs to the playback task.
    pub fn on_transition(&mut self, transition: &Transition) -> bool {
        if transition.to != FatigueState::Fatigue {
            return false;
        }

        if self
            .playing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Alert already playing, not starting another");
            return false;
        }

        let guard = PlaybackGuard(Arc::clone(&self.playing));
        let player = Arc::clone(&self.player);
        let handle = self.runtime.spawn(async move {
            let _guard = guard;
            match player.play().await {
                Ok(()) => debug!("Alert playback finished"),
                Err(e) => warn!("Alert playback failed: {}", e),
            }
        });

        self.in_flight = Some(handle);
        self.started += 1;
        metrics::counter!("fatigue_alerts_started_total").increment(1);
        info!(from = %transition.from, "Fatigue alert started");
        true
    }

    /// Whether a playback is currently in flight
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Number of playbacks started
    pub fn started(&self) -> u64 {
        self.started
    }

    /// Wait for the in-flight playback, if any, to finish
    pub async fn wait_idle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if let Err(e) = handle.await {
                warn!("Alert task ended abnormally: {}", e);
            }
        }
    }

    /// Abort the in-flight playback, if any
    pub async fn shutdown(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            match handle.await {
                Err(e) if e.is_cancelled() => info!("Alert playback cancelled on shutdown"),
                Err(e) => warn!("Alert task ended abnormally: {}", e),
                Ok(()) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AlertError;
    use std::future::Future;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;
    use tokio::sync::Notify;

    /// Plays until released through `gate`
    #[derive(Clone, Default)]
    struct GatedPlayer {
        gate: Arc<Notify>,
        plays: Arc<AtomicUsize>,
    }

    impl AlertPlayer for GatedPlayer {
        fn play(&self) -> impl Future<Output = Result<(), AlertError>> + Send {
            let gate = Arc::clone(&self.gate);
            self.plays.fetch_add(1, Ordering::SeqCst);
            async move {
                gate.notified().await;
                Ok(())
            }
        }
    }

    struct FailingPlayer;

    impl AlertPlayer for FailingPlayer {
        fn play(&self) -> impl Future<Output = Result<(), AlertError>> + Send {
            async { Err(AlertError::Playback("speaker unplugged".into())) }
        }
    }

    fn transition(from: FatigueState, to: FatigueState) -> Transition {
        Transition {
            from,
            to,
            at: Instant::now(),
        }
    }

    #[tokio::test]
    async fn test_fatigue_starts_single_playback() {
        let player = GatedPlayer::default();
        let mut dispatcher = AlertDispatcher::new(player.clone(), Handle::current());

        assert!(dispatcher.on_transition(&transition(FatigueState::Normal, FatigueState::Fatigue)));
        assert!(dispatcher.is_playing());

        // a second entry while the first is still playing is ignored
        assert!(!dispatcher.on_transition(&transition(FatigueState::Warning, FatigueState::Fatigue)));
        assert_eq!(dispatcher.started(), 1);

        player.gate.notify_one();
        dispatcher.wait_idle().await;
        assert!(!dispatcher.is_playing());
        assert_eq!(player.plays.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_leaving_fatigue_keeps_flag_until_done() {
        let player = GatedPlayer::default();
        let mut dispatcher = AlertDispatcher::new(player.clone(), Handle::current());

        dispatcher.on_transition(&transition(FatigueState::Normal, FatigueState::Fatigue));
        assert!(!dispatcher.on_transition(&transition(FatigueState::Fatigue, FatigueState::Normal)));
        assert!(dispatcher.is_playing());

        // re-entering fatigue before playback ends does not overlap
        assert!(!dispatcher.on_transition(&transition(FatigueState::Normal, FatigueState::Fatigue)));

        player.gate.notify_one();
        dispatcher.wait_idle().await;
        assert!(dispatcher.on_transition(&transition(FatigueState::Normal, FatigueState::Fatigue)));
        assert_eq!(dispatcher.started(), 2);

        player.gate.notify_one();
        dispatcher.wait_idle().await;
    }

    #[tokio::test]
    async fn test_warning_does_not_alert() {
        let mut dispatcher = AlertDispatcher::new(GatedPlayer::default(), Handle::current());
        assert!(!dispatcher.on_transition(&transition(FatigueState::Normal, FatigueState::Warning)));
        assert!(!dispatcher.is_playing());
    }

    #[tokio::test]
    async fn test_failure_clears_flag() {
        let mut dispatcher = AlertDispatcher::new(FailingPlayer, Handle::current());
        assert!(dispatcher.on_transition(&transition(FatigueState::Normal, FatigueState::Fatigue)));
        dispatcher.wait_idle().await;
        assert!(!dispatcher.is_playing());
        assert!(dispatcher.on_transition(&transition(FatigueState::Normal, FatigueState::Fatigue)));
    }

    #[tokio::test]
    async fn test_shutdown_aborts_playback() {
        let player = GatedPlayer::default();
        let mut dispatcher = AlertDispatcher::new(player, Handle::current());
        dispatcher.on_transition(&transition(FatigueState::Normal, FatigueState::Fatigue));
        assert!(dispatcher.is_playing());

        dispatcher.shutdown().await;
        assert!(!dispatcher.is_playing());
    }
}
