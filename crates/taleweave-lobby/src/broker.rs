//! Connection broker: fan-out to every socket attached to one lobby.
//!
//! The broker holds one bounded outbound channel per connection. A
//! writer task on the server side drains each channel to its socket, so
//! network I/O never runs inside the lobby actor. Delivery into a
//! channel is bounded by a timeout: a consumer that cannot accept a
//! message within `delivery_timeout` is reported as dead, and the actor
//! treats that exactly like a disconnect. One stalled client therefore
//! costs the lobby at most one timeout, never a permanent stall.
//!
//! No game logic lives here.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;

use taleweave_protocol::{ConnectionId, ServerMessage};

/// Sending half of a connection's outbound channel.
pub type ConnectionSender = mpsc::Sender<ServerMessage>;

/// Per-lobby registry of live outbound channels.
pub struct ConnectionBroker {
    connections: HashMap<ConnectionId, ConnectionSender>,
    delivery_timeout: Duration,
}

impl ConnectionBroker {
    /// Creates an empty broker with the given delivery timeout.
    pub fn new(delivery_timeout: Duration) -> Self {
        Self {
            connections: HashMap::new(),
            delivery_timeout,
        }
    }

    /// Associates a connection's outbound channel with this lobby.
    pub fn register(&mut self, id: ConnectionId, sender: ConnectionSender) {
        self.connections.insert(id, sender);
    }

    /// Removes a connection. No-op if it was never registered.
    pub fn unregister(&mut self, id: ConnectionId) {
        self.connections.remove(&id);
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` when no connections are registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Unicast delivery for private acknowledgments.
    ///
    /// Returns `false` when the connection is unknown, its channel is
    /// closed, or delivery timed out — the caller should then treat the
    /// connection as disconnected.
    pub async fn send(&self, id: ConnectionId, msg: ServerMessage) -> bool {
        let Some(sender) = self.connections.get(&id) else {
            return false;
        };
        deliver(sender, id, msg, self.delivery_timeout).await
    }

    /// Delivers `msg` to every registered connection.
    ///
    /// Returns the connections that failed delivery (closed or timed
    /// out). Delivery order across connections is unspecified; order
    /// *per* connection is the channel's FIFO order, which is what
    /// keeps each client's view consistent with the lobby's operation
    /// order.
    pub async fn broadcast(&self, msg: ServerMessage) -> Vec<ConnectionId> {
        let mut dead = Vec::new();
        for (&id, sender) in &self.connections {
            if !deliver(sender, id, msg.clone(), self.delivery_timeout).await {
                dead.push(id);
            }
        }
        dead
    }
}

async fn deliver(
    sender: &ConnectionSender,
    id: ConnectionId,
    msg: ServerMessage,
    timeout: Duration,
) -> bool {
    match sender.send_timeout(msg, timeout).await {
        Ok(()) => true,
        Err(SendTimeoutError::Timeout(_)) => {
            tracing::warn!(%id, "outbound channel stalled, dropping connection");
            false
        }
        Err(SendTimeoutError::Closed(_)) => {
            tracing::debug!(%id, "outbound channel closed");
            false
        }
    }
}
