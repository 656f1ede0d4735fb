//! `GuessWhatServer` configuration, builder, and accept loop.
//!
//! This ties the layers together: transport → protocol → session → room.

use std::sync::Arc;

use guesswhat_protocol::{Codec, JsonCodec};
use guesswhat_room::{RoomConfig, RoomRegistry};
use guesswhat_transport::{Transport, WebSocketTransport};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::GuessWhatError;
use crate::handler::handle_connection;

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Everything needed to start a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    /// Rules for every room on this server.
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: Self::DEFAULT_ADDR.to_owned(),
            room: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    pub const DEFAULT_ADDR: &'static str = "0.0.0.0:8080";

    /// Overrides the bind address.
    pub const ADDR_ENV: &'static str = "GUESSWHAT_ADDR";

    /// Path to a JSON file holding a [`RoomConfig`].
    pub const ROOM_CONFIG_ENV: &'static str = "GUESSWHAT_ROOM_CONFIG";

    /// Defaults, overridden by the environment.
    ///
    /// # Errors
    /// [`GuessWhatError::Config`] if the room config file cannot be read or
    /// parsed.
    pub fn from_env() -> Result<Self, GuessWhatError> {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var(Self::ADDR_ENV) {
            config.bind_addr = addr;
        }
        if let Ok(path) = std::env::var(Self::ROOM_CONFIG_ENV) {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| GuessWhatError::Config(format!("{path}: {e}")))?;
            config.room = serde_json::from_str(&text)
                .map_err(|e| GuessWhatError::Config(format!("{path}: {e}")))?;
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State shared by every connection task.
pub(crate) struct ServerState<K: Codec> {
    pub(crate) rooms: RoomRegistry,
    pub(crate) codec: K,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring and starting a GuessWhat server.
///
/// # Example
///
/// ```rust,no_run
/// use guesswhat::prelude::*;
///
/// # async fn run() -> Result<(), GuessWhatError> {
/// let server = GuessWhatServer::builder()
///     .bind("127.0.0.1:8080")
///     .room_config(RoomConfig::default())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct GuessWhatServerBuilder {
    config: ServerConfig,
    rng: Option<StdRng>,
}

impl GuessWhatServerBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: ServerConfig) -> Self {
        Self { config, rng: None }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        addr.clone_into(&mut self.config.bind_addr);
        self
    }

    /// Sets the rules every room uses.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    /// Makes room codes and every game decision reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Some(StdRng::seed_from_u64(seed));
        self
    }

    /// Binds the listener.
    ///
    /// # Errors
    /// [`GuessWhatError::Transport`] if the address cannot be bound.
    pub async fn build(self) -> Result<GuessWhatServer<JsonCodec>, GuessWhatError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let rooms = match self.rng {
            Some(rng) => RoomRegistry::with_rng(self.config.room, rng),
            None => RoomRegistry::new(self.config.room),
        };

        let state = Arc::new(ServerState {
            rooms,
            codec: JsonCodec,
        });
        Ok(GuessWhatServer { transport, state })
    }
}

impl Default for GuessWhatServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A bound GuessWhat server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GuessWhatServer<K: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<K>>,
}

impl GuessWhatServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> GuessWhatServerBuilder {
        GuessWhatServerBuilder::new()
    }
}

impl<K> GuessWhatServer<K>
where
    K: Codec + Clone,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning one task per connection.
    ///
    /// A failed accept or a failing connection is logged and never stops
    /// the loop. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), GuessWhatError> {
        tracing::info!("GuessWhat server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
