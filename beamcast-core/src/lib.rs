pub mod model;

pub use model::{CandidateInfo, CandidateSeen, IceServerConfig, Role, RoomName, SignalMessage};
