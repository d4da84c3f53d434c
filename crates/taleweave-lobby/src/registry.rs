//! Lobby registry: creation, lookup, listing and reclamation of lobbies.
//!
//! The registry owns the map from lobby id to actor handle. Callers are
//! expected to hold it behind a single async mutex, which makes the
//! join / empty-lobby-removal race impossible: a join that acquires the
//! registry first will find the lobby, a removal that acquires it first
//! will leave the join with a clean `NotFound`.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;

use taleweave_adventure::AdventureCatalog;
use taleweave_protocol::{
    AdventureId, ConnectionId, LobbyDetail, LobbyId, LobbyList,
};

use crate::lobby::spawn_lobby;
use crate::{ConnectionSender, LobbyConfig, LobbyError, LobbyHandle, RegistryError};

const LOBBY_ID_LEN: usize = 8;
const LOBBY_ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Owns every live lobby and the catalog of playable adventures.
pub struct LobbyRegistry {
    catalog: Arc<AdventureCatalog>,
    config: LobbyConfig,
    lobbies: HashMap<LobbyId, LobbyHandle>,
}

impl LobbyRegistry {
    /// Creates a registry with default session policy.
    pub fn new(catalog: Arc<AdventureCatalog>) -> Self {
        Self::with_config(catalog, LobbyConfig::default())
    }

    /// Creates a registry with explicit session policy.
    pub fn with_config(catalog: Arc<AdventureCatalog>, config: LobbyConfig) -> Self {
        Self {
            catalog,
            config,
            lobbies: HashMap::new(),
        }
    }

    /// Spawns a new lobby for `adventure_id` and returns its id.
    pub fn create(
        &mut self,
        max_players: usize,
        adventure_id: AdventureId,
    ) -> Result<LobbyId, RegistryError> {
        if max_players == 0 {
            return Err(RegistryError::InvalidParameter(
                "max_players must be at least 1".to_string(),
            ));
        }
        let adventure = self
            .catalog
            .get(adventure_id)
            .cloned()
            .map(Arc::new)
            .ok_or(RegistryError::UnknownAdventure(adventure_id))?;

        let id = self.generate_id();
        let handle = spawn_lobby(id.clone(), max_players, adventure, &self.config);
        self.lobbies.insert(id.clone(), handle);

        tracing::info!(
            lobby_id = %id,
            max_players,
            adventure_id = %adventure_id,
            lobbies = self.lobbies.len(),
            "lobby created"
        );
        Ok(id)
    }

    /// Returns a handle to a live lobby.
    pub fn get(&self, lobby_id: &LobbyId) -> Result<LobbyHandle, RegistryError> {
        self.lobbies
            .get(lobby_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(lobby_id.clone()))
    }

    /// Adds a connection to a lobby and returns the handle for its
    /// later in-game operations.
    pub async fn join(
        &mut self,
        lobby_id: &LobbyId,
        connection_id: ConnectionId,
        display_name: String,
        sender: ConnectionSender,
    ) -> Result<LobbyHandle, RegistryError> {
        let handle = self.get(lobby_id)?;
        handle.join(connection_id, display_name, sender).await?;
        Ok(handle)
    }

    /// Removes a connection from its lobby, reclaiming the lobby when
    /// it empties out.
    pub async fn disconnect(
        &mut self,
        lobby_id: &LobbyId,
        connection_id: ConnectionId,
    ) -> Result<(), RegistryError> {
        let handle = self.get(lobby_id)?;
        let remaining = handle.leave(connection_id).await?;
        if remaining == 0 {
            self.remove(lobby_id).await;
        }
        Ok(())
    }

    /// Snapshot of one lobby.
    pub async fn detail(
        &self,
        lobby_id: &LobbyId,
    ) -> Result<LobbyDetail, RegistryError> {
        let handle = self.get(lobby_id)?;
        Ok(handle.snapshot().await?)
    }

    /// Clones out the handle of every live lobby.
    ///
    /// Listing is a two-step affair: grab the handles while the
    /// registry is held, then await [`collect_lobby_list`] after
    /// releasing it. A lobby actor busy waiting out a stalled consumer
    /// must never stall creates and joins for unrelated lobbies behind
    /// the registry.
    pub fn handles(&self) -> Vec<LobbyHandle> {
        self.lobbies.values().cloned().collect()
    }

    /// Stops a lobby's actor and drops it from the registry.
    pub async fn remove(&mut self, lobby_id: &LobbyId) {
        if let Some(handle) = self.lobbies.remove(lobby_id) {
            let _ = handle.shutdown().await;
            tracing::info!(
                lobby_id = %lobby_id,
                lobbies = self.lobbies.len(),
                "lobby removed"
            );
        }
    }

    /// Number of live lobbies.
    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    /// Returns `true` when no lobbies exist.
    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }

    /// Returns `true` if a lobby with this id exists.
    pub fn contains(&self, lobby_id: &LobbyId) -> bool {
        self.lobbies.contains_key(lobby_id)
    }

    /// The adventure catalog this registry creates lobbies from.
    pub fn catalog(&self) -> &AdventureCatalog {
        &self.catalog
    }

    fn generate_id(&self) -> LobbyId {
        let mut rng = rand::rng();
        loop {
            let id: String = (0..LOBBY_ID_LEN)
                .map(|_| {
                    let i = rng.random_range(0..LOBBY_ID_CHARSET.len());
                    LOBBY_ID_CHARSET[i] as char
                })
                .collect();
            let id = LobbyId::from(id);
            if !self.lobbies.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Snapshots every handle into a listing.
///
/// Each lobby is snapshotted independently; the listing is a
/// point-in-time view per lobby, not a cross-lobby transaction.
/// Lobbies whose actor died are skipped.
pub async fn collect_lobby_list(handles: Vec<LobbyHandle>) -> LobbyList {
    let mut lobbies = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.snapshot().await {
            Ok(detail) => lobbies.push(detail.summary()),
            Err(LobbyError::Unavailable(id)) => {
                tracing::warn!(lobby_id = %id, "skipping dead lobby in listing");
            }
            Err(_) => {}
        }
    }
    LobbyList {
        total_lobbies: lobbies.len(),
        lobbies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> LobbyRegistry {
        LobbyRegistry::new(Arc::new(AdventureCatalog::builtin()))
    }

    #[tokio::test]
    async fn test_create_produces_joinable_lobby() {
        let mut registry = registry();
        let id = registry.create(4, AdventureId(1)).unwrap();

        assert_eq!(id.as_str().len(), LOBBY_ID_LEN);
        assert!(registry.contains(&id));

        let detail = registry.detail(&id).await.unwrap();
        assert_eq!(detail.max_players, 4);
        assert_eq!(detail.current_players, 0);
        assert!(!detail.game_started);
    }

    #[tokio::test]
    async fn test_create_rejects_zero_capacity() {
        let mut registry = registry();
        assert!(matches!(
            registry.create(0, AdventureId(1)),
            Err(RegistryError::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_adventure() {
        let mut registry = registry();
        assert!(matches!(
            registry.create(4, AdventureId(999)),
            Err(RegistryError::UnknownAdventure(AdventureId(999)))
        ));
    }

    #[tokio::test]
    async fn test_get_unknown_lobby_is_not_found() {
        let registry = registry();
        assert!(matches!(
            registry.get(&LobbyId::from("nope1234")),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_last_disconnect_removes_lobby() {
        let mut registry = registry();
        let id = registry.create(4, AdventureId(1)).unwrap();

        let (tx, _rx) = tokio::sync::mpsc::channel(8);
        registry
            .join(&id, ConnectionId(1), "Ada".to_string(), tx)
            .await
            .unwrap();
        assert_eq!(registry.len(), 1);

        registry.disconnect(&id, ConnectionId(1)).await.unwrap();
        assert!(registry.is_empty());
        assert!(!registry.contains(&id));
    }

    #[tokio::test]
    async fn test_disconnect_with_players_left_keeps_lobby() {
        let mut registry = registry();
        let id = registry.create(4, AdventureId(1)).unwrap();

        let (tx1, _rx1) = tokio::sync::mpsc::channel(8);
        let (tx2, _rx2) = tokio::sync::mpsc::channel(8);
        registry
            .join(&id, ConnectionId(1), "Ada".to_string(), tx1)
            .await
            .unwrap();
        registry
            .join(&id, ConnectionId(2), "Grace".to_string(), tx2)
            .await
            .unwrap();

        registry.disconnect(&id, ConnectionId(1)).await.unwrap();
        assert!(registry.contains(&id));

        let detail = registry.detail(&id).await.unwrap();
        assert_eq!(detail.current_players, 1);
        assert_eq!(detail.players[0].name, "Grace");
    }

    #[tokio::test]
    async fn test_list_reflects_live_lobbies() {
        let mut registry = registry();
        let a = registry.create(2, AdventureId(1)).unwrap();
        let _b = registry.create(6, AdventureId(1)).unwrap();

        let list = collect_lobby_list(registry.handles()).await;
        assert_eq!(list.total_lobbies, 2);
        assert_eq!(list.lobbies.len(), 2);

        registry.remove(&a).await;
        let list = collect_lobby_list(registry.handles()).await;
        assert_eq!(list.total_lobbies, 1);
    }

    #[tokio::test]
    async fn test_listing_snapshots_run_without_registry_access() {
        let mut registry = registry();
        let a = registry.create(2, AdventureId(1)).unwrap();
        let _b = registry.create(6, AdventureId(1)).unwrap();

        // Handles are cloned out first; the registry is free to change
        // (or sit behind a released lock) while snapshots are taken.
        let handles = registry.handles();
        assert_eq!(handles.len(), 2);
        registry.remove(&a).await;

        // The shut-down lobby is skipped, the survivor is listed.
        let list = collect_lobby_list(handles).await;
        assert_eq!(list.total_lobbies, 1);
        assert_eq!(list.lobbies[0].max_players, 6);
    }

    #[tokio::test]
    async fn test_generated_ids_are_unique() {
        let mut registry = registry();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..32 {
            let id = registry.create(4, AdventureId(1)).unwrap();
            assert!(ids.insert(id));
        }
    }
}
