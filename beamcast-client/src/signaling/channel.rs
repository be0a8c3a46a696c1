use crate::error::SessionError;
use async_trait::async_trait;
use beamcast_core::SignalMessage;

/// Outbound half of the signaling transport. The inbound half is an
/// `mpsc::Receiver<SignalMessage>` handed to the `RoomSession` at start;
/// a closed receiver means the relay connection is gone.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    /// Queue one message for the relay. An error means the channel can no
    /// longer make progress, not that the message was malformed.
    async fn send(&self, msg: SignalMessage) -> Result<(), SessionError>;
}
