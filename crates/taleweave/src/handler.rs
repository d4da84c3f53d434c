//! Per-connection handler: join routing, writer task, and read loop.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Parse `/join/{lobby_id}?name=...` from the handshake URI
//!   2. Join the lobby through the registry (rejection closes the
//!      socket with the reason, before any lobby traffic)
//!   3. Spawn a writer task draining the broker channel to the sink
//!   4. Loop: read client messages, decode, route to the lobby actor
//!   5. On exit: disconnect through the registry

use std::sync::Arc;

use tokio::sync::mpsc;

use taleweave_lobby::{LobbyHandle, RegistryError};
use taleweave_protocol::{decode, encode, ClientMessage, ConnectionId, LobbyId};
use taleweave_transport::{WebSocketConnection, WebSocketReceiver};

use crate::server::ServerState;
use crate::ServerError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), ServerError> {
    let conn_id = conn.id();
    let uri = conn.request_uri().to_string();
    tracing::debug!(%conn_id, uri = %uri, "handling new connection");

    let (mut ws_tx, mut ws_rx) = conn.split();

    let Some((lobby_id, display_name)) = parse_join_uri(&uri) else {
        tracing::debug!(%conn_id, uri = %uri, "malformed join path");
        let _ = ws_tx.close_with_reason("invalid join path").await;
        return Ok(());
    };

    // The outbound channel: lobby broker on one end, writer task on the
    // other. Bounded, so a stalled socket shows up as backpressure the
    // broker can time out on.
    let (out_tx, mut out_rx) =
        mpsc::channel(state.config.outbound_buffer);

    let handle = {
        let mut registry = state.registry.lock().await;
        match registry.join(&lobby_id, conn_id, display_name, out_tx).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::info!(
                    %conn_id,
                    lobby_id = %lobby_id,
                    reason = %e,
                    "join refused"
                );
                let _ = ws_tx.close_with_reason(&e.to_string()).await;
                return Ok(());
            }
        }
    };

    tracing::info!(%conn_id, lobby_id = %lobby_id, "player connected");

    // Writer task: drains broker messages to the socket. Ends when the
    // broker drops the sender (leave/disconnect) or the socket dies.
    let writer = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let text = match encode(&msg) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode outbound message");
                    continue;
                }
            };
            if ws_tx.send_text(text).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    read_loop(&mut ws_rx, &handle, conn_id).await;

    // Cleanup runs on every exit path: clean close, socket error, or a
    // dead lobby actor.
    {
        let mut registry = state.registry.lock().await;
        match registry.disconnect(&lobby_id, conn_id).await {
            Ok(()) | Err(RegistryError::NotFound(_)) => {}
            Err(e) => {
                tracing::debug!(
                    %conn_id,
                    lobby_id = %lobby_id,
                    error = %e,
                    "disconnect cleanup failed"
                );
            }
        }
    }

    tracing::info!(%conn_id, lobby_id = %lobby_id, "player disconnected");
    let _ = writer.await;
    Ok(())
}

/// Reads client messages until the socket closes or the lobby goes away.
///
/// Undecodable frames are logged and skipped; only transport errors
/// end the loop.
async fn read_loop(
    ws_rx: &mut WebSocketReceiver,
    handle: &LobbyHandle,
    conn_id: ConnectionId,
) {
    loop {
        let text = match ws_rx.recv_text().await {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                return;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                return;
            }
        };

        let msg: ClientMessage = match decode(&text) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(
                    %conn_id,
                    error = %e,
                    "failed to decode client message"
                );
                continue;
            }
        };

        let routed = match msg {
            ClientMessage::ToggleReady => {
                handle.toggle_ready(conn_id).await
            }
            ClientMessage::StartAdventure => {
                handle.start_adventure(conn_id).await
            }
            ClientMessage::SubmitChoice { choice_index } => {
                handle.submit_choice(conn_id, choice_index).await
            }
        };

        if let Err(e) = routed {
            tracing::debug!(%conn_id, error = %e, "lobby gone, ending connection");
            return;
        }
    }
}

/// Parses `/join/{lobby_id}` with an optional `?name=` query.
fn parse_join_uri(uri: &str) -> Option<(LobbyId, String)> {
    let (path, query) = match uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (uri, None),
    };

    let mut segments = path.split('/');
    if !segments.next()?.is_empty() {
        return None;
    }
    if segments.next()? != "join" {
        return None;
    }
    let lobby_id = segments.next().filter(|s| !s.is_empty())?;
    if segments.next().is_some() {
        return None;
    }

    let name = query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .find_map(|pair| pair.strip_prefix("name="))
        .unwrap_or("")
        .to_string();

    Some((LobbyId::from(lobby_id), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join_uri_with_name() {
        let (id, name) = parse_join_uri("/join/a1b2c3d4?name=Ada").unwrap();
        assert_eq!(id, LobbyId::from("a1b2c3d4"));
        assert_eq!(name, "Ada");
    }

    #[test]
    fn test_parse_join_uri_without_name() {
        let (id, name) = parse_join_uri("/join/a1b2c3d4").unwrap();
        assert_eq!(id, LobbyId::from("a1b2c3d4"));
        assert_eq!(name, "");
    }

    #[test]
    fn test_parse_join_uri_extra_query_params() {
        let (id, name) =
            parse_join_uri("/join/xyz?token=t&name=Grace").unwrap();
        assert_eq!(id, LobbyId::from("xyz"));
        assert_eq!(name, "Grace");
    }

    #[test]
    fn test_parse_join_uri_rejects_other_paths() {
        assert!(parse_join_uri("/").is_none());
        assert!(parse_join_uri("/join").is_none());
        assert!(parse_join_uri("/join/").is_none());
        assert!(parse_join_uri("/join/a/b").is_none());
        assert!(parse_join_uri("/lobby/a1b2c3d4").is_none());
    }
}
