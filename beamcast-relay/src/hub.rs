use beamcast_core::{RoomName, SignalMessage};
use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Relay-side identity for one WebSocket connection.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct ClientId(pub Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
struct RoomState {
    members: HashMap<ClientId, mpsc::UnboundedSender<SignalMessage>>,
    presenter: Option<ClientId>,
}

/// Room-keyed fan-out hub. Frames are relayed verbatim to every other
/// member of the sender's room; the hub only interprets `join`, `offer`
/// and `end-presentation` to track membership and the single presenter
/// slot per room.
#[derive(Clone, Default)]
pub struct RoomHub {
    rooms: Arc<DashMap<String, RoomState>>,
}

impl RoomHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a member and acknowledge with `joined`.
    pub fn join(&self, room: &RoomName, id: ClientId, tx: mpsc::UnboundedSender<SignalMessage>) {
        let mut state = self.rooms.entry(room.as_str().to_string()).or_default();
        state.members.insert(id, tx.clone());
        info!(room = %room, client = %id, "client joined room");
        let _ = tx.send(SignalMessage::Joined);
    }

    /// Relay one frame from `sender` to every other room member. An offer
    /// claims the room's presenter slot; a second presenter gets
    /// `error{presenter-exists}` instead of a relay.
    pub fn relay(&self, room: &RoomName, sender: ClientId, msg: SignalMessage) {
        let Some(mut state) = self.rooms.get_mut(room.as_str()) else {
            warn!(room = %room, client = %sender, "relay for unknown room");
            return;
        };

        match &msg {
            SignalMessage::Offer { .. } => match state.presenter {
                Some(current) if current != sender => {
                    debug!(room = %room, client = %sender, "second presenter refused");
                    if let Some(tx) = state.members.get(&sender) {
                        let _ = tx.send(SignalMessage::Error {
                            reason: "presenter-exists".to_string(),
                        });
                    }
                    return;
                }
                _ => state.presenter = Some(sender),
            },
            SignalMessage::EndPresentation => {
                if state.presenter == Some(sender) {
                    state.presenter = None;
                }
            }
            _ => {}
        }

        for (id, tx) in &state.members {
            if *id != sender {
                let _ = tx.send(msg.clone());
            }
        }
    }

    /// Drop a member. A departing presenter is announced to the rest of
    /// the room; an emptied room is deleted.
    pub fn leave(&self, room: &RoomName, id: ClientId) {
        let mut remove_room = false;
        if let Some(mut state) = self.rooms.get_mut(room.as_str()) {
            state.members.remove(&id);
            if state.presenter == Some(id) {
                state.presenter = None;
                info!(room = %room, client = %id, "presenter disconnected");
                for tx in state.members.values() {
                    let _ = tx.send(SignalMessage::PresenterLeft);
                }
            }
            remove_room = state.members.is_empty();
        }
        if remove_room {
            self.rooms.remove(room.as_str());
            debug!(room = %room, "room emptied");
        }
    }
}
