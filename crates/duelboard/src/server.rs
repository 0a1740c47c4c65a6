//! `DuelboardServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → rooms.

use std::sync::Arc;
use std::time::Duration;

use duelboard_board::MoveProvider;
use duelboard_protocol::{Codec, JsonCodec};
use duelboard_room::{RegistryConfig, RoomConfig, RoomRegistry};
use duelboard_transport::{Transport, WebSocketTransport};

use crate::DuelboardError;
use crate::ServerConfig;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: RoomRegistry,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Duelboard server.
///
/// # Example
///
/// ```rust,no_run
/// use duelboard::prelude::*;
///
/// # async fn run() -> Result<(), DuelboardError> {
/// let server = DuelboardServer::builder()
///     .bind("0.0.0.0:3000")
///     .variant(BoardVariant::Classic)
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct DuelboardServerBuilder {
    config: ServerConfig,
    provider: Option<Arc<dyn MoveProvider>>,
}

impl DuelboardServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            provider: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Drops connections that stay silent this long. `None` disables it.
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Replaces the registry policy wholesale.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.config.registry = config;
        self
    }

    /// Settings for rooms created without explicit options.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.registry.room = config;
        self
    }

    /// Board used by rooms created without an explicit variant.
    pub fn variant(mut self, variant: duelboard_board::BoardVariant) -> Self {
        self.config.registry.room.variant = variant;
        self
    }

    /// Whether joining an unknown room id creates it.
    pub fn create_on_join(mut self, enabled: bool) -> Self {
        self.config.registry.create_on_join = enabled;
        self
    }

    /// Move source for computer seats. Defaults to `NearestOpenCell`.
    pub fn move_provider(mut self, provider: Arc<dyn MoveProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<DuelboardServer<JsonCodec>, DuelboardError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let registry = match self.provider {
            Some(provider) => RoomRegistry::with_provider(self.config.registry.clone(), provider),
            None => RoomRegistry::new(self.config.registry.clone()),
        };

        let state = Arc::new(ServerState {
            registry,
            codec: JsonCodec,
            config: self.config,
        });

        Ok(DuelboardServer { transport, state })
    }
}

impl Default for DuelboardServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A Duelboard game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct DuelboardServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl DuelboardServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> DuelboardServerBuilder {
        DuelboardServerBuilder::new()
    }
}

impl<C: Codec> DuelboardServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The server's room registry. Clones share the same rooms.
    pub fn registry(&self) -> RoomRegistry {
        self.state.registry.clone()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), DuelboardError> {
        tracing::info!(
            addr = %self.state.config.bind_addr,
            variant = %self.state.config.registry.room.variant,
            "Duelboard server running"
        );

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
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
