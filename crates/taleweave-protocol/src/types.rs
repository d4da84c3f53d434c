//! Identity types shared across the workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle for one live connection, stable for the life of one
/// socket. Assigned by the transport layer from a monotonic counter.
///
/// `#[serde(transparent)]` keeps the JSON form a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Unique identifier for a lobby, generated at creation and immutable.
///
/// The string form is URL-safe so it can appear verbatim in the join
/// path (`/join/{lobby_id}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LobbyId(pub String);

impl LobbyId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LobbyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LobbyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of an adventure in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdventureId(pub u32);

impl fmt::Display for AdventureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adventure-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&ConnectionId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId(7).to_string(), "conn-7");
    }

    #[test]
    fn test_lobby_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&LobbyId::from("a1b2c3d4")).unwrap();
        assert_eq!(json, "\"a1b2c3d4\"");
    }

    #[test]
    fn test_lobby_id_deserializes_from_plain_string() {
        let id: LobbyId = serde_json::from_str("\"a1b2c3d4\"").unwrap();
        assert_eq!(id, LobbyId::from("a1b2c3d4"));
    }

    #[test]
    fn test_adventure_id_round_trip() {
        let id = AdventureId(3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "3");
        let back: AdventureId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
