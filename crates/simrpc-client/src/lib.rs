//! Synchronous RPC client for vehicle simulation hosts.
//!
//! One [`RpcSession`] holds one transport connection and performs one call
//! at a time: encode the call envelope, write it in full, block until the
//! response envelope arrives, validate correlation, and hand back the raw
//! result payload. Everything above — the typed [`VehicleClient`] wrapper,
//! the record types in [`types`] — is thin marshaling over
//! [`RpcSession::call`].

pub mod connector;
pub mod error;
pub mod session;
pub mod types;
pub mod vehicle;

pub use connector::{connect, connect_with_config, SessionConfig};
pub use error::{ClientError, Result};
pub use session::RpcSession;
pub use vehicle::VehicleClient;
