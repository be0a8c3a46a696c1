mod command;
mod event;
mod retry;
mod room_session;

pub use command::SessionCommand;
pub use event::SessionEvent;
pub use retry::NeedOfferRetry;
pub use room_session::RoomSession;
