use crate::hub::{ClientId, RoomHub};
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use beamcast_core::{RoomName, SignalMessage};
use futures::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<RoomHub>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: RoomHub) {
    let client_id = ClientId::new();
    info!(client = %client_id, "new signaling connection");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<SignalMessage>();

    // the room joined by this connection, set once by the recv task
    let room_slot: Arc<Mutex<Option<RoomName>>> = Arc::new(Mutex::new(None));

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "failed to serialize signaling frame");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let hub = hub.clone();
        let tx = tx.clone();
        let room_slot = room_slot.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        let signal = match serde_json::from_str::<SignalMessage>(&text) {
                            Ok(signal) => signal,
                            Err(e) => {
                                warn!(client = %client_id, error = %e, "invalid frame ignored");
                                continue;
                            }
                        };

                        let joined = room_slot.lock().unwrap_or_else(|e| e.into_inner()).clone();
                        match (joined, signal) {
                            (None, SignalMessage::Join { room }) if !room.as_str().is_empty() => {
                                hub.join(&room, client_id, tx.clone());
                                *room_slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(room);
                            }
                            (None, _) => {
                                // everything before a valid join is refused
                                let _ = tx.send(SignalMessage::Error {
                                    reason: "missing room".to_string(),
                                });
                            }
                            (Some(room), SignalMessage::Join { .. }) => {
                                debug!(client = %client_id, room = %room, "duplicate join ignored");
                            }
                            (Some(room), signal) => hub.relay(&room, client_id, signal),
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    if let Some(room) = room_slot.lock().unwrap_or_else(|e| e.into_inner()).take() {
        hub.leave(&room, client_id);
    }
    info!(client = %client_id, "signaling connection closed");
}
