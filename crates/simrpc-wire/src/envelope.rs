use std::io::{Read, Write};

use crate::error::{Result, WireError};
use crate::value::{DecodeConfig, Value};

/// Message-type constant for request envelopes.
pub const REQUEST: i64 = 0;

/// Message-type constant for response envelopes.
pub const RESPONSE: i64 = 1;

/// Call envelope: `[REQUEST, call_id, method, args]`.
///
/// `call_id` is the caller-assigned correlation token; with one call in
/// flight per session it stays `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub call_id: u32,
    pub method: String,
    pub args: Vec<Value>,
}

impl Request {
    /// Create a request with call id `0`.
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self::with_call_id(0, method, args)
    }

    /// Create a request with an explicit correlation token.
    pub fn with_call_id(call_id: u32, method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            call_id,
            method: method.into(),
            args,
        }
    }

    /// Encode the complete envelope.
    pub fn encode_to<W: Write>(&self, wr: &mut W) -> Result<()> {
        let envelope = Value::Array(vec![
            Value::Int(REQUEST),
            Value::Int(i64::from(self.call_id)),
            Value::Str(self.method.clone()),
            Value::Array(self.args.clone()),
        ]);
        envelope.encode_to(wr)
    }

    /// Decode a request envelope. Used by mock hosts in tests and tooling;
    /// the client itself only sends requests.
    pub fn decode_from<R: Read>(rd: &mut R) -> Result<Self> {
        let fields = decode_envelope(rd, &DecodeConfig::default())?;
        let [message_type, call_id, method, args] = fields;

        let message_type = envelope_int(&message_type, "message type")?;
        if message_type != REQUEST {
            return Err(WireError::MalformedEnvelope {
                reason: format!("message type {message_type} is not a request"),
            });
        }
        let call_id = envelope_call_id(&call_id)?;
        let method = match method {
            Value::Str(method) => method,
            other => {
                return Err(WireError::MalformedEnvelope {
                    reason: format!("method field is not a string: {other}"),
                })
            }
        };
        let args = match args {
            Value::Array(args) => args,
            other => {
                return Err(WireError::MalformedEnvelope {
                    reason: format!("arguments field is not an array: {other}"),
                })
            }
        };

        Ok(Self {
            call_id,
            method,
            args,
        })
    }
}

/// Response envelope: `[RESPONSE, call_id, error, result]`.
///
/// Decoding enforces structural shape only — a four-element array with
/// integer type and call id fields. Whether `message_type` is actually
/// [`RESPONSE`] and whether `call_id` matches the request are semantic
/// checks that belong to the invoker, which knows the originating call.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Raw message-type field as received.
    pub message_type: i64,
    pub call_id: u32,
    /// `Nil` on success; the remote failure payload otherwise.
    pub error: Value,
    /// Result payload; unspecified content when `error` is present.
    pub result: Value,
}

impl Response {
    /// A successful response. Used by mock hosts in tests and tooling.
    pub fn success(call_id: u32, result: Value) -> Self {
        Self {
            message_type: RESPONSE,
            call_id,
            error: Value::Nil,
            result,
        }
    }

    /// A failed response carrying the remote error payload.
    pub fn failure(call_id: u32, error: Value) -> Self {
        Self {
            message_type: RESPONSE,
            call_id,
            error,
            result: Value::Nil,
        }
    }

    /// Whether the remote reported a failure.
    pub fn is_error(&self) -> bool {
        !self.error.is_nil()
    }

    /// Encode the complete envelope. Used by mock hosts.
    pub fn encode_to<W: Write>(&self, wr: &mut W) -> Result<()> {
        let envelope = Value::Array(vec![
            Value::Int(self.message_type),
            Value::Int(i64::from(self.call_id)),
            self.error.clone(),
            self.result.clone(),
        ]);
        envelope.encode_to(wr)
    }

    /// Decode a response envelope (blocking) with default limits.
    pub fn decode_from<R: Read>(rd: &mut R) -> Result<Self> {
        Self::decode_from_with(rd, &DecodeConfig::default())
    }

    /// Decode a response envelope with explicit limits.
    pub fn decode_from_with<R: Read>(rd: &mut R, config: &DecodeConfig) -> Result<Self> {
        let fields = decode_envelope(rd, config)?;
        let [message_type, call_id, error, result] = fields;

        Ok(Self {
            message_type: envelope_int(&message_type, "message type")?,
            call_id: envelope_call_id(&call_id)?,
            error,
            result,
        })
    }
}

fn decode_envelope<R: Read>(rd: &mut R, config: &DecodeConfig) -> Result<[Value; 4]> {
    let envelope = Value::decode_from_with(rd, config)?;
    let items = match envelope {
        Value::Array(items) => items,
        other => {
            return Err(WireError::MalformedEnvelope {
                reason: format!("expected array envelope, got {other}"),
            })
        }
    };

    <[Value; 4]>::try_from(items).map_err(|items| WireError::MalformedEnvelope {
        reason: format!("expected 4 fields, got {}", items.len()),
    })
}

fn envelope_int(value: &Value, field: &str) -> Result<i64> {
    value.as_i64().ok_or_else(|| WireError::MalformedEnvelope {
        reason: format!("{field} field is not an integer: {value}"),
    })
}

fn envelope_call_id(value: &Value) -> Result<u32> {
    let raw = envelope_int(value, "call id")?;
    u32::try_from(raw).map_err(|_| WireError::MalformedEnvelope {
        reason: format!("call id {raw} out of range"),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn request_golden_bytes() {
        // [0, 0, "ping", []]
        let mut buf = Vec::new();
        Request::new("ping", vec![]).encode_to(&mut buf).unwrap();
        assert_eq!(buf, vec![0x94, 0x00, 0x00, 0xa4, b'p', b'i', b'n', b'g', 0x90]);
    }

    #[test]
    fn request_roundtrip() {
        let request = Request::with_call_id(
            7,
            "armDisarm",
            vec![Value::Bool(true), Value::Str(String::new())],
        );
        let mut buf = Vec::new();
        request.encode_to(&mut buf).unwrap();

        let decoded = Request::decode_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn response_roundtrip_success() {
        let response = Response::success(3, Value::Bool(true));
        let mut buf = Vec::new();
        response.encode_to(&mut buf).unwrap();

        let decoded = Response::decode_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(decoded, response);
        assert!(!decoded.is_error());
    }

    #[test]
    fn response_roundtrip_failure() {
        let response = Response::failure(0, Value::Str("vehicle not found".to_string()));
        let mut buf = Vec::new();
        response.encode_to(&mut buf).unwrap();

        let decoded = Response::decode_from(&mut Cursor::new(buf)).unwrap();
        assert!(decoded.is_error());
        assert_eq!(decoded.error.as_str(), Some("vehicle not found"));
        assert!(decoded.result.is_nil());
    }

    #[test]
    fn response_decode_preserves_foreign_message_type() {
        // Shape is valid, semantics are not; the invoker decides.
        let mut buf = Vec::new();
        Value::Array(vec![
            Value::Int(2),
            Value::Int(0),
            Value::Nil,
            Value::Bool(true),
        ])
        .encode_to(&mut buf)
        .unwrap();

        let decoded = Response::decode_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(decoded.message_type, 2);
    }

    #[test]
    fn response_rejects_non_array() {
        let mut buf = Vec::new();
        Value::Str("nope".to_string()).encode_to(&mut buf).unwrap();

        let err = Response::decode_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, WireError::MalformedEnvelope { .. }));
    }

    #[test]
    fn response_rejects_wrong_arity() {
        let mut buf = Vec::new();
        Value::Array(vec![Value::Int(1), Value::Int(0), Value::Nil])
            .encode_to(&mut buf)
            .unwrap();

        let err = Response::decode_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, WireError::MalformedEnvelope { .. }));
    }

    #[test]
    fn response_rejects_non_integer_call_id() {
        let mut buf = Vec::new();
        Value::Array(vec![
            Value::Int(1),
            Value::Str("zero".to_string()),
            Value::Nil,
            Value::Nil,
        ])
        .encode_to(&mut buf)
        .unwrap();

        let err = Response::decode_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, WireError::MalformedEnvelope { .. }));
    }

    #[test]
    fn request_rejects_non_string_method() {
        let mut buf = Vec::new();
        Value::Array(vec![
            Value::Int(0),
            Value::Int(0),
            Value::Int(99),
            Value::Array(vec![]),
        ])
        .encode_to(&mut buf)
        .unwrap();

        let err = Request::decode_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, WireError::MalformedEnvelope { .. }));
    }
}
