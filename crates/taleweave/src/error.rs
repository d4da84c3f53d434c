//! Unified error type for the Taleweave server.

use taleweave_lobby::{LobbyError, RegistryError};
use taleweave_protocol::ProtocolError;
use taleweave_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, handshake, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A registry-level error (unknown lobby or adventure, bad input).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A lobby-level error (full, already started, rejected operation).
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use taleweave_protocol::LobbyId;

    #[test]
    fn test_from_registry_error() {
        let err = RegistryError::NotFound(LobbyId::from("a1b2c3d4"));
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Registry(_)));
        assert!(server_err.to_string().contains("a1b2c3d4"));
    }

    #[test]
    fn test_from_lobby_error() {
        let err = LobbyError::NotHost;
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Lobby(_)));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Protocol(_)));
    }
}
