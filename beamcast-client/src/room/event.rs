use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// Observable output of a `RoomSession`, consumed by the embedding UI.
pub enum SessionEvent {
    /// Human-readable progress line for the status surface.
    Status(String),
    /// Viewer side: a remote media track for the render surface.
    RemoteTrack(Arc<TrackRemote>),
    /// Viewer side: the presenter is gone; clear the render surface.
    RemoteCleared,
    /// Offer/answer exchange reached `Stable`.
    NegotiationComplete,
}
