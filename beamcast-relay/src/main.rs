use anyhow::Result;
use axum::{Router, routing::get};
use beamcast_relay::{RoomHub, ws_handler};
use clap::Parser;
use std::net::SocketAddr;
use tracing::{Level, info};

/// Room-scoped WebSocket signaling relay for beamcast clients.
#[derive(Parser)]
#[command(name = "beamcast-relay")]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:5555")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args = Args::parse();
    let hub = RoomHub::new();

    let app = Router::new().route("/ws", get(ws_handler)).with_state(hub);

    info!("signaling relay listening on {}", args.addr);
    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
