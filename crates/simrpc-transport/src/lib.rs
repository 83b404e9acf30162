//! Blocking TCP transport for simulation-host RPC.
//!
//! Owns exactly one persistent byte-stream connection to a simulation host
//! and exposes it as a plain [`Read`](std::io::Read) + [`Write`](std::io::Write)
//! conduit. Framing and message structure belong to the layers above — this
//! crate never interprets payload bytes.
//!
//! This is the lowest layer of simrpc. Everything else builds on top of
//! the [`TcpSession`] type provided here.

pub mod endpoint;
pub mod error;
pub mod tcp;

pub use endpoint::Endpoint;
pub use error::{Result, TransportError};
pub use tcp::TcpSession;
