//! # Taleweave
//!
//! WebSocket lobby server for shared narrative adventures.
//!
//! Players gather in lobbies, signal readiness, and play through an
//! adventure together: each round every connected player submits a
//! choice, the plurality wins, and the story advances for the whole
//! lobby at once.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taleweave::TaleweaveServer;
//! use taleweave_adventure::AdventureCatalog;
//!
//! # async fn run() -> Result<(), taleweave::ServerError> {
//! let server = TaleweaveServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .catalog(Arc::new(AdventureCatalog::builtin()))
//!     .build()
//!     .await?;
//!
//! // Hand `server.service()` to the routing layer, then:
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;
mod service;

pub use error::ServerError;
pub use server::{TaleweaveServer, TaleweaveServerBuilder};
pub use service::LobbyService;
