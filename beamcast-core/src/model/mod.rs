mod candidate;
mod role;
mod room;
mod signaling;

pub use candidate::{CandidateInfo, CandidateSeen};
pub use role::Role;
pub use room::RoomName;
pub use signaling::{IceServerConfig, SignalMessage};
