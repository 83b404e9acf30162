use std::time::Duration;

use simrpc_wire::Value;

/// Errors that can occur when invoking a remote call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection-level failure: the host is unreachable or the stream is
    /// gone. Not retried; open a new session.
    #[error("transport error: {0}")]
    Transport(#[from] simrpc_transport::TransportError),

    /// Envelope-level failure while encoding or decoding.
    #[error("wire error: {0}")]
    Wire(#[from] simrpc_wire::WireError),

    /// The reply to a call is not a RESPONSE message. The byte stream may be
    /// out of alignment; treat the session as suspect.
    #[error("reply to '{method}' is not a RESPONSE message (message type {got})")]
    NotAResponse { method: String, got: i64 },

    /// The reply echoes a different correlation token than the call used.
    /// The byte stream may be out of alignment; treat the session as suspect.
    #[error("call id mismatch for '{method}': expected {expected}, got {got}")]
    CallIdMismatch {
        method: String,
        expected: u32,
        got: u32,
    },

    /// The remote reported a failure for this call. The payload is surfaced
    /// exactly as received.
    #[error("remote error from '{method}': {error}")]
    Remote { method: String, error: Value },

    /// A configured read deadline expired while waiting for the response.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// A result payload did not have the shape a typed wrapper expected.
    #[error("unexpected {what} payload: {detail}")]
    UnexpectedPayload { what: &'static str, detail: String },
}

impl ClientError {
    /// True for failures that indicate client/server protocol
    /// desynchronization rather than a per-call error.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            ClientError::NotAResponse { .. } | ClientError::CallIdMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
