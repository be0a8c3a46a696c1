use crate::model::room::RoomName;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// One signaling frame. Serialized as a flat JSON object tagged by `type`,
/// e.g. `{"type":"join","room":"R1"}` or `{"type":"need-offer"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalMessage {
    Join { room: RoomName },
    Joined,
    NeedOffer,
    Offer { sdp: String },
    Answer { sdp: String },
    Ice { candidate: String },
    EndPresentation,
    PresenterLeft,
    Error { reason: String },
}
