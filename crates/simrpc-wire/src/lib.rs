//! msgpack-rpc envelope codec for simulation-host RPC.
//!
//! The wire format is owned by the remote simulation host and must match it
//! byte for byte: every message is a four-element msgpack array, either
//! `[0, call_id, method, args]` (request) or `[1, call_id, error, result]`
//! (response). msgpack values are self-delimiting, so no extra length framing
//! is layered on top.
//!
//! - [`Value`] — tagged union of every payload type the format can carry,
//!   with explicit per-variant encode/decode.
//! - [`Request`] / [`Response`] — the envelope pair. Decoding enforces
//!   structure only (four fields, integer type and call id); semantic
//!   validation (message type, correlation) belongs to the invoker.

pub mod envelope;
pub mod error;
pub mod value;

pub use envelope::{Request, Response, REQUEST, RESPONSE};
pub use error::{Result, WireError};
pub use value::{DecodeConfig, Value};
