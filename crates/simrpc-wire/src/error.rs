/// Errors that can occur during envelope encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// An I/O error occurred while reading or writing the stream.
    #[error("wire I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete value was received.
    #[error("connection closed (incomplete value)")]
    ConnectionClosed,

    /// The stream contains a msgpack marker this codec does not carry
    /// (extension types, reserved markers).
    #[error("unsupported msgpack marker {marker:?}")]
    UnsupportedMarker { marker: rmp::Marker },

    /// A string value is not valid UTF-8.
    #[error("string value is not valid UTF-8: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),

    /// A string, binary blob, or collection exceeds the configured maximum.
    #[error("value too large ({size} items/bytes, max {max})")]
    TooLarge { size: usize, max: usize },

    /// Nested values exceed the configured depth limit.
    #[error("nesting depth limit exceeded (max {max})")]
    DepthLimit { max: usize },

    /// The decoded value is not a well-formed four-field envelope.
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },
}

pub type Result<T> = std::result::Result<T, WireError>;
