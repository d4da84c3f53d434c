/// Errors raised while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing a message to JSON failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// A received frame was not a valid message.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// A structurally valid message arrived where it is not allowed.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
