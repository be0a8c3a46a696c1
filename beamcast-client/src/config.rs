use beamcast_core::IceServerConfig;
use std::time::Duration;

/// Per-attempt session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// STUN/TURN servers. An empty list is valid and keeps negotiation on
    /// host candidates only (pure LAN mode).
    pub ice_servers: Vec<IceServerConfig>,
    /// Cadence of viewer `need-offer` requests while no offer has been
    /// applied.
    pub need_offer_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ice_servers: Vec::new(),
            need_offer_interval: Duration::from_secs(2),
        }
    }
}
