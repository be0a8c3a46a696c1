use serde::{Deserialize, Serialize};
use std::fmt;

/// Room code that scopes all signaling for one broadcast.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct RoomName(pub String);

impl RoomName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
