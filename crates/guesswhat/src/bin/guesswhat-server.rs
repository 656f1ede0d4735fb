//! Runs a GuessWhat server.
//!
//! `GUESSWHAT_ADDR` sets the listen address (default `0.0.0.0:8080`),
//! `GUESSWHAT_ROOM_CONFIG` points at an optional JSON room config, and
//! `RUST_LOG` filters logs (default `info`).

use guesswhat::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), GuessWhatError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let server = GuessWhatServerBuilder::from_config(config).build().await?;
    match server.local_addr() {
        Ok(addr) => tracing::info!(%addr, "listening"),
        Err(e) => tracing::warn!(error = %e, "local address unavailable"),
    }
    server.run().await
}
