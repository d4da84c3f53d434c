//! WebSocket transport layer for Taleweave.
//!
//! Wraps `tokio-tungstenite` behind a small surface: a listener that
//! captures the request URI during the handshake (the join path carries
//! the lobby id) and a connection that splits into sender and receiver
//! halves for independent read and write tasks.

mod error;
mod websocket;

pub use error::TransportError;
pub use websocket::{
    WebSocketConnection, WebSocketListener, WebSocketReceiver,
    WebSocketSender,
};
