//! Synchronous msgpack-rpc client for vehicle simulation hosts.
//!
//! simrpc talks the simulator's request/response protocol over TCP: one
//! blocking call at a time, positional array envelopes, raw msgpack payloads.
//!
//! # Crate Structure
//!
//! - [`transport`] — TCP session establishment and socket configuration
//! - [`wire`] — msgpack value codec and call/response envelopes
//! - [`client`] — blocking RPC invoker and typed vehicle API (behind the
//!   `client` feature, on by default)

/// Re-export transport types.
pub mod transport {
    pub use simrpc_transport::*;
}

/// Re-export wire types.
pub mod wire {
    pub use simrpc_wire::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use simrpc_client::*;
}
