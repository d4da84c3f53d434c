//! Lobby management facade for the routing layer.
//!
//! Lobby creation, listing and inspection happen outside the socket
//! path (the external routing layer exposes them over HTTP). This
//! facade maps those calls one-to-one onto the registry and returns the
//! wire response shapes directly.

use std::sync::Arc;

use taleweave_adventure::AdventureSummary;
use taleweave_lobby::{collect_lobby_list, RegistryError};
use taleweave_protocol::{
    AdventureId, CreateLobbyResponse, LobbyDetail, LobbyId, LobbyList,
};

use crate::server::ServerState;
use crate::ServerError;

/// Cloneable handle for managing lobbies on a running server.
#[derive(Clone)]
pub struct LobbyService {
    state: Arc<ServerState>,
}

impl LobbyService {
    pub(crate) fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    /// Creates a lobby and returns its generated id.
    pub async fn create_lobby(
        &self,
        max_players: usize,
        adventure_id: AdventureId,
    ) -> Result<CreateLobbyResponse, ServerError> {
        let mut registry = self.state.registry.lock().await;
        let lobby_id = registry.create(max_players, adventure_id)?;
        Ok(CreateLobbyResponse { lobby_id })
    }

    /// Lists every live lobby.
    ///
    /// The registry lock is held only long enough to clone the handles
    /// out; the per-lobby snapshots run after it is released, so one
    /// lobby waiting out a stalled consumer cannot stall creates and
    /// joins for unrelated lobbies.
    pub async fn list_lobbies(&self) -> LobbyList {
        let handles = {
            let registry = self.state.registry.lock().await;
            registry.handles()
        };
        collect_lobby_list(handles).await
    }

    /// Full snapshot of one lobby.
    pub async fn lobby_detail(
        &self,
        lobby_id: &LobbyId,
    ) -> Result<LobbyDetail, ServerError> {
        let handle = {
            let registry = self.state.registry.lock().await;
            registry.get(lobby_id)?
        };
        Ok(handle.snapshot().await.map_err(RegistryError::from)?)
    }

    /// Lists the playable adventures.
    pub async fn adventures(&self) -> Vec<AdventureSummary> {
        let registry = self.state.registry.lock().await;
        registry.catalog().summaries()
    }
}
