//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! The listener captures the HTTP request URI during the handshake, so
//! the server layer can route `/join/{lobby_id}?name=...` connections
//! without a separate HTTP framework. Accepted connections split into
//! independent sender and receiver halves so reads and writes never
//! serialize behind each other.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use taleweave_protocol::ConnectionId;

use crate::TransportError;

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = WebSocketStream<TcpStream>;

/// Listens for incoming WebSocket connections.
pub struct WebSocketListener {
    listener: TcpListener,
}

impl WebSocketListener {
    /// Binds a new WebSocket listener to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener =
            TcpListener::bind(addr).await.map_err(TransportError::Bind)?;
        tracing::info!(addr, "WebSocket listener bound");
        Ok(Self { listener })
    }

    /// The bound local address (useful with a `:0` bind in tests).
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener.local_addr().map_err(TransportError::Bind)
    }

    /// Waits for and accepts the next incoming connection, completing
    /// the WebSocket handshake.
    pub async fn accept(&self) -> Result<WebSocketConnection, TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Accept)?;

        let mut request_uri = String::new();
        let ws = tokio_tungstenite::accept_hdr_async(
            stream,
            |req: &Request, resp: Response| {
                request_uri = req.uri().to_string();
                Ok(resp)
            },
        )
        .await
        .map_err(TransportError::Handshake)?;

        let id =
            ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %addr, uri = %request_uri, "accepted WebSocket connection");

        Ok(WebSocketConnection { id, request_uri, ws })
    }
}

/// An accepted connection, before it is split into its two halves.
pub struct WebSocketConnection {
    id: ConnectionId,
    request_uri: String,
    ws: WsStream,
}

impl WebSocketConnection {
    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The URI the client requested during the handshake, including any
    /// query string.
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    /// Splits into independently owned sender and receiver halves.
    pub fn split(self) -> (WebSocketSender, WebSocketReceiver) {
        let (sink, stream) = self.ws.split();
        (
            WebSocketSender { id: self.id, sink },
            WebSocketReceiver { id: self.id, stream },
        )
    }
}

/// The writing half of a connection.
pub struct WebSocketSender {
    id: ConnectionId,
    sink: SplitSink<WsStream, Message>,
}

impl WebSocketSender {
    /// Sends a text frame to the remote peer.
    pub async fn send_text(
        &mut self,
        text: String,
    ) -> Result<(), TransportError> {
        self.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(TransportError::Send)
    }

    /// Closes the connection with a policy-violation close frame
    /// carrying `reason` (used for join rejections).
    pub async fn close_with_reason(
        &mut self,
        reason: &str,
    ) -> Result<(), TransportError> {
        let frame = CloseFrame {
            code: CloseCode::Policy,
            reason: reason.to_string().into(),
        };
        self.sink
            .send(Message::Close(Some(frame)))
            .await
            .map_err(TransportError::Send)
    }

    /// Closes the connection cleanly.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.sink.close().await.map_err(TransportError::Send)
    }

    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

/// The reading half of a connection.
pub struct WebSocketReceiver {
    id: ConnectionId,
    stream: SplitStream<WsStream>,
}

impl WebSocketReceiver {
    /// Receives the next text payload from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is closed. Binary frames
    /// holding valid UTF-8 are accepted as text; ping/pong frames are
    /// skipped.
    pub async fn recv_text(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => {
                    match String::from_utf8(data.to_vec()) {
                        Ok(text) => return Ok(Some(text)),
                        Err(_) => {
                            tracing::debug!(
                                id = %self.id,
                                "dropping non-UTF-8 binary frame"
                            );
                            continue;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => return Err(TransportError::Receive(e)),
            }
        }
    }

    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}
