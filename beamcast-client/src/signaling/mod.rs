mod channel;
mod ws;

pub use channel::SignalingChannel;
pub use ws::WsSignalingChannel;
