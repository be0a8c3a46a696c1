use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use webrtc::track::track_local::TrackLocal;

/// Live tracks produced by a capture backend.
pub type CaptureTracks = Vec<Arc<dyn TrackLocal + Send + Sync>>;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct CaptureError(pub String);

/// Screen/window capture seam. The core only consumes live tracks; how
/// they are produced (display grab, test pattern, ...) is the embedder's
/// concern.
#[async_trait]
pub trait CaptureSource: Send + Sync {
    /// Acquire zero or more live tracks. Failure is terminal for the
    /// current attempt and surfaced as a status message; the core never
    /// retries capture on its own.
    async fn acquire(&self) -> Result<CaptureTracks, CaptureError>;
}
