use std::time::Duration;

use simrpc_transport::{Endpoint, TcpSession};
use simrpc_wire::DecodeConfig;
use tracing::debug;

use crate::error::Result;
use crate::session::RpcSession;

/// Session-level configuration.
///
/// All timeouts default to `None` — a call blocks indefinitely, matching the
/// strictly synchronous protocol. Setting `response_timeout` arms a read
/// deadline on the socket so a silent host surfaces as
/// [`ClientError::Timeout`](crate::ClientError::Timeout).
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Upper bound on connection establishment.
    pub connect_timeout: Option<Duration>,
    /// Upper bound on waiting for a response envelope.
    pub response_timeout: Option<Duration>,
    /// Upper bound on writing a call envelope.
    pub write_timeout: Option<Duration>,
    /// Decode limits for inbound payloads.
    pub decode: DecodeConfig,
}

/// Open a session to a simulation host with default configuration.
pub fn connect(endpoint: &Endpoint) -> Result<RpcSession<TcpSession>> {
    connect_with_config(endpoint, &SessionConfig::default())
}

/// Open a session with explicit configuration.
pub fn connect_with_config(
    endpoint: &Endpoint,
    config: &SessionConfig,
) -> Result<RpcSession<TcpSession>> {
    let stream = match config.connect_timeout {
        Some(timeout) => TcpSession::connect_timeout(endpoint, timeout)?,
        None => TcpSession::connect(endpoint)?,
    };
    stream.set_read_timeout(config.response_timeout)?;
    stream.set_write_timeout(config.write_timeout)?;

    debug!(%endpoint, "rpc session established");

    let mut session = RpcSession::with_decode_config(stream, config.decode.clone());
    session.set_response_timeout(config.response_timeout);
    Ok(session)
}
