//! Alert players

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::AlertError;

/// Something that can sound the fatigue alert.
///
/// `play` resolves when playback has finished; dropping the future must stop
/// playback.
pub trait AlertPlayer: Send + Sync + 'static {
    fn play(&self) -> impl Future<Output = Result<(), AlertError>> + Send;
}

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Disable to only log alerts
    pub enabled: bool,
    /// External player program (e.g. "aplay", "paplay")
    pub command: Option<String>,
    /// Arguments passed to the player, usually the sound file
    pub args: Vec<String>,
    /// Upper bound on a single playback (seconds)
    pub timeout_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: None,
            args: Vec::new(),
            timeout_secs: 15,
        }
    }
}

/// Runs an external program to play the alert sound
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

impl AlertPlayer for CommandPlayer {
    fn play(&self) -> impl Future<Output = Result<(), AlertError>> + Send {
        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);
        let program = self.program.clone();
        let timeout = self.timeout;

        async move {
            debug!("Launching alert player {}", program);
            let status = tokio::time::timeout(timeout, command.status())
                .await
                .map_err(|_| AlertError::Timeout(timeout))??;

            if status.success() {
                Ok(())
            } else {
                Err(AlertError::Playback(format!("{} exited with {}", program, status)))
            }
        }
    }
}

/// Headless player that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPlayer;

impl AlertPlayer for LogPlayer {
    fn play(&self) -> impl Future<Output = Result<(), AlertError>> + Send {
        async {
            info!("FATIGUE ALERT: driver appears drowsy");
            Ok(())
        }
    }
}

/// Player selected from configuration
#[derive(Debug, Clone)]
pub enum ConfiguredPlayer {
    Command(CommandPlayer),
    Log(LogPlayer),
}

impl ConfiguredPlayer {
    pub fn from_config(config: &AlertConfig) -> Self {
        match (&config.command, config.enabled) {
            (Some(program), true) => Self::Command(CommandPlayer::new(
                program.clone(),
                config.args.clone(),
                Duration::from_secs(config.timeout_secs),
            )),
            (None, true) => {
                warn!("No alert command configured, alerts will only be logged");
                Self::Log(LogPlayer)
            }
            (_, false) => Self::Log(LogPlayer),
        }
    }
}

impl AlertPlayer for ConfiguredPlayer {
    fn play(&self) -> impl Future<Output = Result<(), AlertError>> + Send {
        let player = self.clone();
        async move {
            match player {
                Self::Command(p) => p.play().await,
                Self::Log(p) => p.play().await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_selection() {
        let config = AlertConfig {
            command: Some("aplay".into()),
            args: vec!["alert.wav".into()],
            ..Default::default()
        };
        assert!(matches!(ConfiguredPlayer::from_config(&config), ConfiguredPlayer::Command(_)));

        let disabled = AlertConfig {
            enabled: false,
            ..config
        };
        assert!(matches!(ConfiguredPlayer::from_config(&disabled), ConfiguredPlayer::Log(_)));
        assert!(matches!(
            ConfiguredPlayer::from_config(&AlertConfig::default()),
            ConfiguredPlayer::Log(_)
        ));
    }

    #[tokio::test]
    async fn test_log_player_succeeds() {
        assert!(LogPlayer.play().await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let player = CommandPlayer::new(
            "definitely-not-an-installed-player",
            Vec::new(),
            Duration::from_secs(1),
        );
        assert!(matches!(player.play().await, Err(AlertError::Launch(_))));
    }
}
