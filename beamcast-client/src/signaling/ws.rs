use crate::error::SessionError;
use crate::signaling::SignalingChannel;
use async_trait::async_trait;
use beamcast_core::SignalMessage;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

/// WebSocket signaling transport. One frame per message, JSON-encoded.
pub struct WsSignalingChannel {
    out_tx: mpsc::UnboundedSender<SignalMessage>,
}

impl WsSignalingChannel {
    /// Connect to the relay and split the socket into this outbound sender
    /// and the inbound message stream. The inbound stream closes when the
    /// socket drops, which the `RoomSession` treats as "cannot progress".
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::Receiver<SignalMessage>), SessionError> {
        let (socket, _) = connect_async(url)
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        debug!(%url, "signaling socket connected");

        let (mut sink, mut stream) = socket.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<SignalMessage>();
        let (in_tx, in_rx) = mpsc::channel::<SignalMessage>(64);

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(error = %e, "failed to serialize signaling frame");
                        continue;
                    }
                };
                if sink.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(error = %e, "signaling socket error");
                        break;
                    }
                };
                match frame {
                    Message::Text(text) => {
                        match serde_json::from_str::<SignalMessage>(&text) {
                            Ok(msg) => {
                                if in_tx.send(msg).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!(error = %e, "unparseable signaling frame ignored"),
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            // in_tx drops here, closing the inbound stream
        });

        Ok((Self { out_tx }, in_rx))
    }
}

#[async_trait]
impl SignalingChannel for WsSignalingChannel {
    async fn send(&self, msg: SignalMessage) -> Result<(), SessionError> {
        self.out_tx
            .send(msg)
            .map_err(|_| SessionError::ChannelClosed)
    }
}
