//! Messages and lobby snapshots that travel on the wire.
//!
//! Every message is internally tagged (`{"type": "...", ...}`) with a
//! snake_case tag, which is what the browser client parses. The field
//! names here are a contract with the client — changing them breaks the
//! frontend, so the serde tests below pin the exact JSON shapes.

use serde::{Deserialize, Serialize};

use crate::LobbyId;

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// A message sent by a connected client over its lobby socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Flip the sender's ready flag.
    ToggleReady,

    /// Start the adventure. Only honored when sent by the host.
    StartAdventure,

    /// Submit a choice for the active round.
    SubmitChoice { choice_index: usize },
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// A message pushed by the server to one or all connections of a lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full lobby snapshot, broadcast after every state change.
    LobbyInfo { lobby: LobbyDetail },

    /// Private acknowledgment of a `toggle_ready`.
    ReadyToggled { success: bool, is_ready: bool },

    /// Acknowledgment of `start_adventure`. Broadcast with
    /// `success: true` when the game starts; unicast with a reason
    /// when the start was rejected.
    StartAdventure {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Private acknowledgment of a `submit_choice` that did not yet
    /// resolve the round, or a rejection with a reason.
    ChoiceSubmitted {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// The resolved next round, broadcast to every connection.
    NewRound {
        round_index: usize,
        text: String,
        choices: Vec<String>,
    },

    /// Terminal notification: the story ended on `round_index`.
    /// Shape is symmetric with `new_round`; `choices` is empty.
    AdventureFinished {
        round_index: usize,
        text: String,
        choices: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Lobby snapshots
// ---------------------------------------------------------------------------

/// One player as seen in a lobby snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub is_ready: bool,
}

/// Summary of a lobby, as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbySummary {
    pub id: LobbyId,
    pub max_players: usize,
    pub current_players: usize,
    pub adventure_title: String,
    pub game_started: bool,
    pub is_full: bool,
    pub players: Vec<PlayerSummary>,
}

/// Full lobby view: the summary plus the adventure description and the
/// active round index (`None` until the game starts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyDetail {
    pub id: LobbyId,
    pub max_players: usize,
    pub current_players: usize,
    pub adventure_title: String,
    pub adventure_description: String,
    pub game_started: bool,
    pub is_full: bool,
    pub current_round: Option<usize>,
    pub players: Vec<PlayerSummary>,
}

impl LobbyDetail {
    /// Projects the detail down to the list-endpoint summary.
    pub fn summary(&self) -> LobbySummary {
        LobbySummary {
            id: self.id.clone(),
            max_players: self.max_players,
            current_players: self.current_players,
            adventure_title: self.adventure_title.clone(),
            game_started: self.game_started,
            is_full: self.is_full,
            players: self.players.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Routing-layer responses
// ---------------------------------------------------------------------------

/// Response body for lobby creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLobbyResponse {
    pub lobby_id: LobbyId,
}

/// Response body for the lobby list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyList {
    pub total_lobbies: usize,
    pub lobbies: Vec<LobbySummary>,
}

#[cfg(test)]
mod tests {
    //! Wire-shape tests. The frontend parses these exact JSON forms, so
    //! a serde attribute regression here is a client-visible break.

    use super::*;

    fn sample_detail() -> LobbyDetail {
        LobbyDetail {
            id: LobbyId::from("a1b2c3d4"),
            max_players: 4,
            current_players: 2,
            adventure_title: "The Hollow Lighthouse".into(),
            adventure_description: "A storm-lashed rescue".into(),
            game_started: false,
            is_full: false,
            current_round: None,
            players: vec![
                PlayerSummary { name: "Player 1".into(), is_ready: true },
                PlayerSummary { name: "Player 2".into(), is_ready: false },
            ],
        }
    }

    #[test]
    fn test_toggle_ready_json_format() {
        let json = serde_json::to_value(&ClientMessage::ToggleReady).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "toggle_ready" }));
    }

    #[test]
    fn test_start_adventure_inbound_json_format() {
        let json =
            serde_json::to_value(&ClientMessage::StartAdventure).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "start_adventure" }));
    }

    #[test]
    fn test_submit_choice_json_format() {
        let msg = ClientMessage::SubmitChoice { choice_index: 2 };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "submit_choice");
        assert_eq!(json["choice_index"], 2);
    }

    #[test]
    fn test_client_message_parses_from_client_json() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type": "submit_choice", "choice_index": 0}"#,
        )
        .unwrap();
        assert_eq!(msg, ClientMessage::SubmitChoice { choice_index: 0 });
    }

    #[test]
    fn test_unknown_client_message_type_is_an_error() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type": "fly_to_moon"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_lobby_info_json_format() {
        let msg = ServerMessage::LobbyInfo { lobby: sample_detail() };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "lobby_info");
        assert_eq!(json["lobby"]["id"], "a1b2c3d4");
        assert_eq!(json["lobby"]["max_players"], 4);
        assert_eq!(json["lobby"]["current_players"], 2);
        assert_eq!(json["lobby"]["adventure_title"], "The Hollow Lighthouse");
        assert_eq!(json["lobby"]["game_started"], false);
        assert_eq!(json["lobby"]["is_full"], false);
        assert!(json["lobby"]["current_round"].is_null());
        assert_eq!(json["lobby"]["players"][0]["name"], "Player 1");
        assert_eq!(json["lobby"]["players"][0]["is_ready"], true);
    }

    #[test]
    fn test_ready_toggled_json_format() {
        let msg = ServerMessage::ReadyToggled { success: true, is_ready: false };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "ready_toggled");
        assert_eq!(json["success"], true);
        assert_eq!(json["is_ready"], false);
    }

    #[test]
    fn test_start_adventure_success_omits_reason() {
        let msg = ServerMessage::StartAdventure { success: true, reason: None };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "start_adventure");
        assert_eq!(json["success"], true);
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn test_start_adventure_failure_carries_reason() {
        let msg = ServerMessage::StartAdventure {
            success: false,
            reason: Some("not all players are ready".into()),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["reason"], "not all players are ready");
    }

    #[test]
    fn test_new_round_json_format() {
        let msg = ServerMessage::NewRound {
            round_index: 0,
            text: "You stand at the gate.".into(),
            choices: vec!["left".into(), "right".into()],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "new_round");
        assert_eq!(json["round_index"], 0);
        assert_eq!(json["text"], "You stand at the gate.");
        assert_eq!(json["choices"], serde_json::json!(["left", "right"]));
    }

    #[test]
    fn test_adventure_finished_is_symmetric_with_new_round() {
        let msg = ServerMessage::AdventureFinished {
            round_index: 3,
            text: "The story ends here.".into(),
            choices: vec![],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "adventure_finished");
        assert_eq!(json["round_index"], 3);
        assert_eq!(json["choices"], serde_json::json!([]));
    }

    #[test]
    fn test_server_message_round_trip() {
        let msg = ServerMessage::LobbyInfo { lobby: sample_detail() };
        let bytes = serde_json::to_vec(&msg).unwrap();
        let decoded: ServerMessage = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_lobby_list_json_format() {
        let list = LobbyList {
            total_lobbies: 1,
            lobbies: vec![sample_detail().summary()],
        };
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["total_lobbies"], 1);
        assert_eq!(json["lobbies"][0]["id"], "a1b2c3d4");
        // Summaries must not leak detail-only fields.
        assert!(json["lobbies"][0].get("current_round").is_none());
        assert!(json["lobbies"][0].get("adventure_description").is_none());
    }

    #[test]
    fn test_create_lobby_response_json_format() {
        let resp = CreateLobbyResponse { lobby_id: LobbyId::from("deadbeef") };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, serde_json::json!({ "lobby_id": "deadbeef" }));
    }
}
