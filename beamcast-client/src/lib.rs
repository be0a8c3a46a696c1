pub mod config;
pub mod error;
pub mod media;
pub mod room;
pub mod session;
pub mod signaling;

pub use config::SessionConfig;
pub use error::SessionError;
pub use media::{CaptureError, CaptureSource, CaptureTracks};
pub use room::{NeedOfferRetry, RoomSession, SessionCommand, SessionEvent};
pub use session::{NegotiationState, PeerEvent, PeerSession};
pub use signaling::{SignalingChannel, WsSignalingChannel};
