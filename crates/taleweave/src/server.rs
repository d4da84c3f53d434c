//! `TaleweaveServer` builder and accept loop.
//!
//! This is the entry point for running a Taleweave lobby server. It
//! ties together the layers: transport → protocol → lobby.

use std::sync::Arc;

use tokio::sync::Mutex;

use taleweave_adventure::AdventureCatalog;
use taleweave_lobby::{LobbyConfig, LobbyRegistry};
use taleweave_transport::WebSocketListener;

use crate::handler::handle_connection;
use crate::{LobbyService, ServerError};

/// Shared server state passed to each connection handler task.
///
/// The registry sits behind a single `Mutex`: creates, joins and
/// empty-lobby removals all serialize through it, so a join can never
/// race the removal of the lobby it is joining.
pub(crate) struct ServerState {
    pub(crate) registry: Mutex<LobbyRegistry>,
    pub(crate) config: LobbyConfig,
}

/// Builder for configuring and starting a Taleweave server.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use taleweave::TaleweaveServer;
/// use taleweave_adventure::AdventureCatalog;
///
/// # async fn run() -> Result<(), taleweave::ServerError> {
/// let server = TaleweaveServer::builder()
///     .bind("0.0.0.0:8080")
///     .catalog(Arc::new(AdventureCatalog::builtin()))
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct TaleweaveServerBuilder {
    bind_addr: String,
    catalog: Option<Arc<AdventureCatalog>>,
    config: LobbyConfig,
}

impl TaleweaveServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            catalog: None,
            config: LobbyConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the adventure catalog. Defaults to the builtin catalog.
    pub fn catalog(mut self, catalog: Arc<AdventureCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets the lobby session policy.
    pub fn lobby_config(mut self, config: LobbyConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<TaleweaveServer, ServerError> {
        let listener = WebSocketListener::bind(&self.bind_addr).await?;

        let catalog = self
            .catalog
            .unwrap_or_else(|| Arc::new(AdventureCatalog::builtin()));
        let registry =
            LobbyRegistry::with_config(catalog, self.config.clone());

        let state = Arc::new(ServerState {
            registry: Mutex::new(registry),
            config: self.config,
        });

        Ok(TaleweaveServer { listener, state })
    }
}

impl Default for TaleweaveServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Taleweave lobby server.
///
/// Call [`run()`](Self::run) to start accepting connections. The
/// routing layer keeps a [`LobbyService`] handle for lobby management
/// outside the socket path.
pub struct TaleweaveServer {
    listener: WebSocketListener,
    state: Arc<ServerState>,
}

impl TaleweaveServer {
    /// Creates a new builder.
    pub fn builder() -> TaleweaveServerBuilder {
        TaleweaveServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Returns the management facade over this server's lobbies.
    pub fn service(&self) -> LobbyService {
        LobbyService::new(Arc::clone(&self.state))
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// A handler failure ends only its own connection. Runs until the
    /// process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Taleweave server running");

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
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
