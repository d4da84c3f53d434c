//! Lobby session engine for Taleweave.
//!
//! Each lobby runs as an isolated Tokio task (actor model) that owns the
//! player roster, readiness flags, host identity, and round progression
//! for one game session. The command channel is the serialization unit:
//! no two operations on the same lobby ever interleave, which is what
//! rules out lost updates on the last free slot, host succession, and
//! round advancement.
//!
//! # Key types
//!
//! - [`LobbyRegistry`] — creates/destroys lobbies, looks them up by id
//! - [`LobbyHandle`] — send operations to a running lobby actor
//! - [`ConnectionBroker`] — fan-out to every socket of one lobby
//! - [`resolve_round`] — the pure choice-aggregation policy
//! - [`LobbyConfig`] — session policy (start minimum, delivery timeout)

mod broker;
mod config;
mod error;
mod lobby;
mod registry;
mod resolver;

pub use broker::{ConnectionBroker, ConnectionSender};
pub use config::LobbyConfig;
pub use error::{LobbyError, RegistryError};
pub use lobby::LobbyHandle;
pub use registry::{collect_lobby_list, LobbyRegistry};
pub use resolver::resolve_round;
