use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("webrtc error: {0}")]
    Rtc(#[from] webrtc::Error),

    #[error("signaling channel closed")]
    ChannelClosed,

    #[error("signaling transport error: {0}")]
    Transport(String),
}
