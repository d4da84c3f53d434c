//! Lobby actor: an isolated Tokio task that owns one game session.
//!
//! Each lobby runs in its own task and is driven through an mpsc
//! command channel — the actor pattern. Processing one command to
//! completion (including its broadcast dispatch) before receiving the
//! next is what gives every lobby a single total order of mutating
//! operations: two joins racing for the last slot, or a choice racing a
//! disconnect, are decided by channel arrival order, never by
//! interleaving.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use taleweave_adventure::{Adventure, RoundOutcome};
use taleweave_protocol::{
    ConnectionId, LobbyDetail, LobbyId, PlayerSummary, ServerMessage,
};

use crate::{resolve_round, ConnectionBroker, ConnectionSender, LobbyConfig, LobbyError};

/// One member of the roster. Join order is the Vec order, which is also
/// the host succession order.
#[derive(Debug, Clone)]
struct Player {
    connection_id: ConnectionId,
    name: String,
    is_ready: bool,
    is_host: bool,
}

/// Commands sent to a lobby actor through its channel.
///
/// Join and Leave carry a reply channel because their caller needs the
/// outcome synchronously (connection rejection, empty-lobby cleanup).
/// The in-game operations are fire-and-forget — their results travel to
/// clients as acknowledgments through the broker.
pub(crate) enum LobbyCommand {
    Join {
        connection_id: ConnectionId,
        display_name: String,
        sender: ConnectionSender,
        reply: oneshot::Sender<Result<(), LobbyError>>,
    },
    Leave {
        connection_id: ConnectionId,
        reply: oneshot::Sender<usize>,
    },
    ToggleReady {
        connection_id: ConnectionId,
    },
    StartAdventure {
        connection_id: ConnectionId,
    },
    SubmitChoice {
        connection_id: ConnectionId,
        choice_index: usize,
    },
    Snapshot {
        reply: oneshot::Sender<LobbyDetail>,
    },
    Shutdown,
}

/// Handle to a running lobby actor. Cheap to clone.
#[derive(Clone, Debug)]
pub struct LobbyHandle {
    lobby_id: LobbyId,
    sender: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    /// Returns the lobby's unique id.
    pub fn lobby_id(&self) -> &LobbyId {
        &self.lobby_id
    }

    /// Adds a player, registering its outbound channel with the broker.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        display_name: String,
        sender: ConnectionSender,
    ) -> Result<(), LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::Join {
                connection_id,
                display_name,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| LobbyError::Unavailable(self.lobby_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| LobbyError::Unavailable(self.lobby_id.clone()))?
    }

    /// Removes a player. Returns the number of players remaining right
    /// after the removal, so the registry can reclaim the lobby once it
    /// hits zero. Connections that fail the follow-up broadcast are not
    /// counted out here; their own leave calls report the drop.
    pub async fn leave(
        &self,
        connection_id: ConnectionId,
    ) -> Result<usize, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::Leave { connection_id, reply: reply_tx })
            .await
            .map_err(|_| LobbyError::Unavailable(self.lobby_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| LobbyError::Unavailable(self.lobby_id.clone()))
    }

    /// Flips the player's ready flag (fire-and-forget).
    pub async fn toggle_ready(
        &self,
        connection_id: ConnectionId,
    ) -> Result<(), LobbyError> {
        self.sender
            .send(LobbyCommand::ToggleReady { connection_id })
            .await
            .map_err(|_| LobbyError::Unavailable(self.lobby_id.clone()))
    }

    /// Asks the lobby to start the adventure (fire-and-forget).
    pub async fn start_adventure(
        &self,
        connection_id: ConnectionId,
    ) -> Result<(), LobbyError> {
        self.sender
            .send(LobbyCommand::StartAdventure { connection_id })
            .await
            .map_err(|_| LobbyError::Unavailable(self.lobby_id.clone()))
    }

    /// Submits a choice for the active round (fire-and-forget).
    pub async fn submit_choice(
        &self,
        connection_id: ConnectionId,
        choice_index: usize,
    ) -> Result<(), LobbyError> {
        self.sender
            .send(LobbyCommand::SubmitChoice { connection_id, choice_index })
            .await
            .map_err(|_| LobbyError::Unavailable(self.lobby_id.clone()))
    }

    /// Takes a consistent snapshot of the lobby.
    pub async fn snapshot(&self) -> Result<LobbyDetail, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| LobbyError::Unavailable(self.lobby_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| LobbyError::Unavailable(self.lobby_id.clone()))
    }

    /// Tells the lobby actor to stop.
    pub async fn shutdown(&self) -> Result<(), LobbyError> {
        self.sender
            .send(LobbyCommand::Shutdown)
            .await
            .map_err(|_| LobbyError::Unavailable(self.lobby_id.clone()))
    }
}

/// The actor state. Lives inside one Tokio task; nothing else mutates it.
struct LobbyActor {
    id: LobbyId,
    max_players: usize,
    min_players: usize,
    adventure: Arc<Adventure>,
    players: Vec<Player>,
    game_started: bool,
    finished: bool,
    current_round: Option<usize>,
    pending_choices: HashMap<ConnectionId, usize>,
    broker: ConnectionBroker,
    receiver: mpsc::Receiver<LobbyCommand>,
}

impl LobbyActor {
    async fn run(mut self) {
        tracing::info!(lobby_id = %self.id, "lobby actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                LobbyCommand::Join { connection_id, display_name, sender, reply } => {
                    let result =
                        self.handle_join(connection_id, display_name, sender);
                    let accepted = result.is_ok();
                    let _ = reply.send(result);
                    if accepted {
                        self.settle().await;
                    }
                }
                LobbyCommand::Leave { connection_id, reply } => {
                    // Reply with the post-removal count before the
                    // broadcast pass: the caller holds the registry and
                    // must not wait out delivery timeouts. Connections
                    // reaped during the settle report through their own
                    // leave calls.
                    let removed = self.remove_player(connection_id);
                    let _ = reply.send(self.players.len());
                    if removed {
                        self.settle().await;
                    }
                }
                LobbyCommand::ToggleReady { connection_id } => {
                    self.handle_toggle_ready(connection_id).await;
                }
                LobbyCommand::StartAdventure { connection_id } => {
                    self.handle_start(connection_id).await;
                }
                LobbyCommand::SubmitChoice { connection_id, choice_index } => {
                    self.handle_submit(connection_id, choice_index).await;
                }
                LobbyCommand::Snapshot { reply } => {
                    let _ = reply.send(self.detail());
                }
                LobbyCommand::Shutdown => {
                    tracing::info!(lobby_id = %self.id, "lobby shutting down");
                    break;
                }
            }
        }

        tracing::info!(lobby_id = %self.id, "lobby actor stopped");
    }

    // -- join / leave ------------------------------------------------------

    fn handle_join(
        &mut self,
        connection_id: ConnectionId,
        display_name: String,
        sender: ConnectionSender,
    ) -> Result<(), LobbyError> {
        if self.game_started {
            return Err(LobbyError::GameAlreadyStarted(self.id.clone()));
        }
        if self.players.len() >= self.max_players {
            return Err(LobbyError::LobbyFull(self.id.clone()));
        }

        let name = self.assign_name(display_name);
        let is_host = self.players.is_empty();
        self.players.push(Player {
            connection_id,
            name: name.clone(),
            is_ready: false,
            is_host,
        });
        self.broker.register(connection_id, sender);

        tracing::info!(
            lobby_id = %self.id,
            %connection_id,
            name = %name,
            host = is_host,
            players = self.players.len(),
            "player joined"
        );
        Ok(())
    }

    /// Picks the client-supplied name, or the first free "Player N".
    fn assign_name(&self, display_name: String) -> String {
        let trimmed = display_name.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
        let mut n = 1;
        while self.players.iter().any(|p| p.name == format!("Player {n}")) {
            n += 1;
        }
        format!("Player {n}")
    }

    /// Roster mutation shared by `leave` and broadcast-failure reaping:
    /// drops the player, transfers host status to the earliest remaining
    /// joiner, and prunes the player's pending choice. Returns `false`
    /// if the connection was not a player (no-op).
    fn remove_player(&mut self, connection_id: ConnectionId) -> bool {
        let Some(index) =
            self.players.iter().position(|p| p.connection_id == connection_id)
        else {
            return false;
        };

        let removed = self.players.remove(index);
        self.broker.unregister(connection_id);
        self.pending_choices.remove(&connection_id);

        if removed.is_host {
            if let Some(next_host) = self.players.first_mut() {
                next_host.is_host = true;
                tracing::info!(
                    lobby_id = %self.id,
                    new_host = %next_host.name,
                    "host left, transferring host status"
                );
            }
        }

        tracing::info!(
            lobby_id = %self.id,
            %connection_id,
            players = self.players.len(),
            "player left"
        );
        true
    }

    // -- in-game operations ------------------------------------------------

    async fn handle_toggle_ready(&mut self, connection_id: ConnectionId) {
        let Some(index) =
            self.players.iter().position(|p| p.connection_id == connection_id)
        else {
            tracing::debug!(
                lobby_id = %self.id,
                %connection_id,
                "toggle_ready from non-member"
            );
            self.unicast(
                connection_id,
                ServerMessage::ReadyToggled { success: false, is_ready: false },
            )
            .await;
            return;
        };

        let player = &mut self.players[index];
        player.is_ready = !player.is_ready;
        let is_ready = player.is_ready;
        tracing::info!(
            lobby_id = %self.id,
            name = %player.name,
            is_ready,
            "ready state toggled"
        );

        // The shared snapshot goes out first; the private ack rides the
        // same per-connection queue, so the client never sees its
        // confirmation before the state it confirms.
        self.settle().await;
        self.unicast(
            connection_id,
            ServerMessage::ReadyToggled { success: true, is_ready },
        )
        .await;
    }

    async fn handle_start(&mut self, connection_id: ConnectionId) {
        if let Err(err) = self.check_start(connection_id) {
            tracing::debug!(lobby_id = %self.id, %connection_id, %err, "start rejected");
            self.unicast(
                connection_id,
                ServerMessage::StartAdventure {
                    success: false,
                    reason: Some(err.to_string()),
                },
            )
            .await;
            return;
        }

        self.game_started = true;
        self.current_round = Some(0);
        self.pending_choices.clear();
        tracing::info!(
            lobby_id = %self.id,
            adventure = %self.adventure.title,
            players = self.players.len(),
            "adventure started"
        );

        let first_round = self.round_message(0);
        self.broadcast_reaping(vec![
            ServerMessage::StartAdventure { success: true, reason: None },
            first_round,
        ])
        .await;
    }

    fn check_start(&self, connection_id: ConnectionId) -> Result<(), LobbyError> {
        let player = self
            .players
            .iter()
            .find(|p| p.connection_id == connection_id)
            .ok_or(LobbyError::PlayerNotFound(connection_id))?;
        if !player.is_host {
            return Err(LobbyError::NotHost);
        }
        if self.game_started {
            return Err(LobbyError::AlreadyStarted);
        }
        if self.players.len() < self.min_players {
            return Err(LobbyError::NotEnoughPlayers { required: self.min_players });
        }
        if self.players.iter().any(|p| !p.is_ready) {
            return Err(LobbyError::NotAllReady);
        }
        Ok(())
    }

    async fn handle_submit(
        &mut self,
        connection_id: ConnectionId,
        choice_index: usize,
    ) {
        if let Err(err) = self.check_submit(connection_id, choice_index) {
            tracing::debug!(
                lobby_id = %self.id,
                %connection_id,
                choice_index,
                %err,
                "choice rejected"
            );
            self.unicast(
                connection_id,
                ServerMessage::ChoiceSubmitted {
                    success: false,
                    reason: Some(err.to_string()),
                },
            )
            .await;
            return;
        }

        // Re-submitting is an idempotent no-op: the first choice stands
        // and the player just gets its acknowledgment again.
        if !self.pending_choices.contains_key(&connection_id) {
            self.pending_choices.insert(connection_id, choice_index);
            tracing::debug!(
                lobby_id = %self.id,
                %connection_id,
                choice_index,
                submitted = self.pending_choices.len(),
                of = self.players.len(),
                "choice recorded"
            );
        }

        if let Some(advance) = self.advance_if_resolved() {
            self.broadcast_reaping(vec![advance]).await;
        } else {
            self.unicast(
                connection_id,
                ServerMessage::ChoiceSubmitted { success: true, reason: None },
            )
            .await;
        }
    }

    fn check_submit(
        &self,
        connection_id: ConnectionId,
        choice_index: usize,
    ) -> Result<(), LobbyError> {
        if !self.game_started {
            return Err(LobbyError::GameNotStarted);
        }
        if self.finished {
            return Err(LobbyError::GameFinished);
        }
        if !self.players.iter().any(|p| p.connection_id == connection_id) {
            return Err(LobbyError::PlayerNotFound(connection_id));
        }
        let round_index = self.current_round.unwrap_or(0);
        let available = self
            .adventure
            .round(round_index)
            .map(|r| r.choices.len())
            .unwrap_or(0);
        if choice_index >= available {
            return Err(LobbyError::InvalidChoice { choice_index, available });
        }
        Ok(())
    }

    // -- round progression -------------------------------------------------

    /// Runs the resolver against the current roster. When the round is
    /// resolved, advances (or finishes) the game state and returns the
    /// message to broadcast; `None` while submissions are outstanding.
    fn advance_if_resolved(&mut self) -> Option<ServerMessage> {
        if !self.game_started || self.finished {
            return None;
        }
        let round_index = self.current_round?;
        let choice_count =
            self.adventure.round(round_index).map(|r| r.choices.len())?;

        let connected: Vec<ConnectionId> =
            self.players.iter().map(|p| p.connection_id).collect();
        let winner =
            resolve_round(choice_count, &connected, &self.pending_choices)?;

        self.pending_choices.clear();
        match self.adventure.outcome(round_index, winner) {
            Some(RoundOutcome::Next(next)) => {
                self.current_round = Some(next);
                tracing::info!(
                    lobby_id = %self.id,
                    winner,
                    round_index = next,
                    "round resolved, advancing"
                );
                Some(self.round_message(next))
            }
            Some(RoundOutcome::Finished) | None => {
                self.finished = true;
                tracing::info!(
                    lobby_id = %self.id,
                    winner,
                    round_index,
                    "round resolved, adventure finished"
                );
                let text = self
                    .adventure
                    .round(round_index)
                    .map(|r| r.text.clone())
                    .unwrap_or_default();
                Some(ServerMessage::AdventureFinished {
                    round_index,
                    text,
                    choices: Vec::new(),
                })
            }
        }
    }

    fn round_message(&self, round_index: usize) -> ServerMessage {
        // Catalog validation guarantees transition targets exist; the
        // fallback keeps a corrupt adventure from panicking the actor.
        match self.adventure.round(round_index) {
            Some(round) => ServerMessage::NewRound {
                round_index,
                text: round.text.clone(),
                choices: round.choices.clone(),
            },
            None => ServerMessage::AdventureFinished {
                round_index,
                text: String::new(),
                choices: Vec::new(),
            },
        }
    }

    // -- broadcast plumbing ------------------------------------------------

    /// Broadcasts the current lobby snapshot and stabilizes the roster:
    /// connections that fail delivery are removed exactly like a leave,
    /// the active round is re-evaluated (a departure can unblock it),
    /// and the updated snapshot goes out again until delivery is clean.
    async fn settle(&mut self) {
        loop {
            let mut outbound = Vec::new();
            if let Some(advance) = self.advance_if_resolved() {
                outbound.push(advance);
            }
            outbound.push(ServerMessage::LobbyInfo { lobby: self.detail() });

            let mut dead = Vec::new();
            for msg in outbound {
                dead.extend(self.broker.broadcast(msg).await);
            }

            let mut changed = false;
            for id in dead {
                changed |= self.remove_player(id);
            }
            if !changed {
                return;
            }
        }
    }

    /// Broadcasts a batch of messages; any connection that dies during
    /// delivery is reaped through the full leave path.
    async fn broadcast_reaping(&mut self, msgs: Vec<ServerMessage>) {
        let mut dead = Vec::new();
        for msg in msgs {
            dead.extend(self.broker.broadcast(msg).await);
        }
        let mut changed = false;
        for id in dead {
            changed |= self.remove_player(id);
        }
        if changed {
            self.settle().await;
        }
    }

    /// Unicast with disconnect handling on failure.
    async fn unicast(&mut self, id: ConnectionId, msg: ServerMessage) {
        if !self.broker.send(id, msg).await && self.remove_player(id) {
            self.settle().await;
        }
    }

    // -- snapshots -----------------------------------------------------------

    fn detail(&self) -> LobbyDetail {
        LobbyDetail {
            id: self.id.clone(),
            max_players: self.max_players,
            current_players: self.players.len(),
            adventure_title: self.adventure.title.clone(),
            adventure_description: self.adventure.description.clone(),
            game_started: self.game_started,
            is_full: self.players.len() >= self.max_players,
            current_round: self.current_round,
            players: self
                .players
                .iter()
                .map(|p| PlayerSummary {
                    name: p.name.clone(),
                    is_ready: p.is_ready,
                })
                .collect(),
        }
    }
}

/// Spawns a new lobby actor task and returns a handle to it.
pub(crate) fn spawn_lobby(
    id: LobbyId,
    max_players: usize,
    adventure: Arc<Adventure>,
    config: &LobbyConfig,
) -> LobbyHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer);

    let actor = LobbyActor {
        id: id.clone(),
        max_players,
        min_players: config.min_players_to_start,
        adventure,
        players: Vec::new(),
        game_started: false,
        finished: false,
        current_round: None,
        pending_choices: HashMap::new(),
        broker: ConnectionBroker::new(config.delivery_timeout),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    LobbyHandle { lobby_id: id, sender: tx }
}
