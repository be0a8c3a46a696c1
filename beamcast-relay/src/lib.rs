pub mod hub;
pub mod ws;

pub use hub::{ClientId, RoomHub};
pub use ws::ws_handler;
