use taleweave_protocol::{AdventureId, ConnectionId, LobbyId};

/// Errors produced by a lobby's own operations.
///
/// Everything here is non-fatal to the lobby: rejections are surfaced
/// to the acting connection as failed acknowledgments (or as a
/// connection-time rejection for the join variants) while the session
/// keeps running.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The roster already holds `max_players`.
    #[error("lobby {0} is full")]
    LobbyFull(LobbyId),

    /// Joins are not accepted once the adventure started.
    #[error("game already started in lobby {0}")]
    GameAlreadyStarted(LobbyId),

    /// The acting connection is not a player of this lobby.
    #[error("player {0} not found in lobby")]
    PlayerNotFound(ConnectionId),

    /// Only the host may start the adventure.
    #[error("only the host can start the adventure")]
    NotHost,

    /// `start_adventure` after the game already started.
    #[error("the adventure has already started")]
    AlreadyStarted,

    /// Some player has not toggled ready yet.
    #[error("not all players are ready")]
    NotAllReady,

    /// The roster is below the configured start minimum.
    #[error("at least {required} players are required to start")]
    NotEnoughPlayers { required: usize },

    /// The submitted index is outside the current round's choice list.
    #[error("choice {choice_index} is out of range ({available} choices)")]
    InvalidChoice { choice_index: usize, available: usize },

    /// `submit_choice` before the adventure started.
    #[error("the adventure has not started")]
    GameNotStarted,

    /// `submit_choice` after the story reached its end.
    #[error("the adventure has already finished")]
    GameFinished,

    /// The lobby actor is gone (shut down or crashed).
    #[error("lobby {0} is unavailable")]
    Unavailable(LobbyId),
}

/// Errors produced by the lobby registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Bad creation input (e.g. `max_players == 0`).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The requested adventure is unknown to the catalog.
    #[error("adventure {0} not found")]
    UnknownAdventure(AdventureId),

    /// No lobby with this id exists.
    #[error("lobby {0} not found")]
    NotFound(LobbyId),

    /// An operation on the lobby itself was rejected.
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}
