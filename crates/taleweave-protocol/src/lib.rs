//! Wire protocol for Taleweave.
//!
//! This crate defines the "language" spoken between clients, the lobby
//! engine, and the routing layer:
//!
//! - **Identity** ([`ConnectionId`], [`LobbyId`], [`AdventureId`]) —
//!   the opaque handles everything else is keyed by.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]) — the tagged
//!   JSON structures that travel on a lobby socket.
//! - **Snapshots** ([`LobbySummary`], [`LobbyDetail`]) — the consistent
//!   views of a lobby rendered for broadcasts and the HTTP-facing API.
//! - **Codec** ([`encode`], [`decode`]) — JSON conversion with
//!   [`ProtocolError`] on failure.
//!
//! The protocol layer knows nothing about sockets or lobby rules — it
//! only fixes the shapes on the wire.

mod codec;
mod error;
mod messages;
mod types;

pub use codec::{decode, encode};
pub use error::ProtocolError;
pub use messages::{
    ClientMessage, CreateLobbyResponse, LobbyDetail, LobbyList,
    LobbySummary, PlayerSummary, ServerMessage,
};
pub use types::{AdventureId, ConnectionId, LobbyId};
