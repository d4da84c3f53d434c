//! JSON codec helpers.
//!
//! All Taleweave traffic is JSON text frames; these two functions are
//! the single place serialization errors are mapped into
//! [`ProtocolError`] so callers can use `?` uniformly.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes a message as a JSON string.
pub fn encode<T: Serialize>(msg: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(ProtocolError::Encode)
}

/// Decodes a message from a JSON text frame.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientMessage;

    #[test]
    fn test_encode_decode_round_trip() {
        let msg = ClientMessage::SubmitChoice { choice_index: 1 };
        let text = encode(&msg).unwrap();
        let back: ClientMessage = decode(&text).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_decode_garbage_returns_error() {
        let result: Result<ClientMessage, _> = decode("not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_shape_returns_error() {
        let result: Result<ClientMessage, _> = decode(r#"{"name": "x"}"#);
        assert!(result.is_err());
    }
}
