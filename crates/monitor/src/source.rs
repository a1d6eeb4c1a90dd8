//! Frame signal sources

use fatigue::FrameSignals;
use std::future::Future;
use std::path::Path;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::info;

/// Signal source error types
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read signals: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed signal record on line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Produces one `FrameSignals` per analyzed frame.
///
/// Stands in for the camera, landmark extractor and behavior classifier.
/// The frame loop awaits `next_frame` once per tick, so a source that takes
/// longer than a tick to resolve delays that tick.
pub trait SignalSource: Send {
    /// Next frame, or `None` once the stream has ended
    fn next_frame(&mut self) -> impl Future<Output = Result<Option<FrameSignals>, SourceError>> + Send;
}

/// Replays recorded signals from JSON lines, one `FrameSignals` per line
pub struct ReplaySource<R> {
    lines: Lines<BufReader<R>>,
    line_no: usize,
}

impl ReplaySource<File> {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        info!("Replaying frame signals from {}", path.display());
        Ok(Self::new(File::open(path).await?))
    }
}

impl<R: AsyncRead + Unpin> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            line_no: 0,
        }
    }
}

impl<R: AsyncRead + Unpin + Send> SignalSource for ReplaySource<R> {
    fn next_frame(&mut self) -> impl Future<Output = Result<Option<FrameSignals>, SourceError>> + Send {
        async move {
            while let Some(line) = self.lines.next_line().await? {
                self.line_no += 1;
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                return serde_json::from_str(trimmed)
                    .map(Some)
                    .map_err(|e| SourceError::Parse {
                        line: self.line_no,
                        message: e.to_string(),
                    });
            }
            Ok(None)
        }
    }
}
