use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};

/// A connected session to a simulation host — implements `Read + Write`.
///
/// The session is a pure byte conduit: it never inspects the payload.
/// There is no reconnection; once the stream fails or is shut down, a new
/// session must be opened with [`TcpSession::connect`].
pub struct TcpSession {
    stream: TcpStream,
    endpoint: Endpoint,
}

impl TcpSession {
    /// Connect to a simulation host (blocking).
    ///
    /// Nagle's algorithm is disabled: every call is a small envelope whose
    /// latency dominates throughput.
    pub fn connect(endpoint: &Endpoint) -> Result<Self> {
        let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port)).map_err(|e| {
            TransportError::Connect {
                endpoint: endpoint.clone(),
                source: e,
            }
        })?;
        Self::from_stream(stream, endpoint.clone())
    }

    /// Connect with an upper bound on connection establishment time.
    pub fn connect_timeout(endpoint: &Endpoint, timeout: Duration) -> Result<Self> {
        let mut addrs = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(|e| TransportError::Connect {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        let addr = addrs.next().ok_or_else(|| TransportError::Connect {
            endpoint: endpoint.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "endpoint resolved to no addresses",
            ),
        })?;
        let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|e| {
            TransportError::Connect {
                endpoint: endpoint.clone(),
                source: e,
            }
        })?;
        Self::from_stream(stream, endpoint.clone())
    }

    fn from_stream(stream: TcpStream, endpoint: Endpoint) -> Result<Self> {
        stream.set_nodelay(true)?;
        debug!(%endpoint, "connected to simulation host");
        Ok(Self { stream, endpoint })
    }

    /// The endpoint this session is connected to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Set read timeout on the underlying stream. `None` blocks indefinitely.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying stream. `None` blocks indefinitely.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Try to clone this session (creates a new file descriptor over the
    /// same connection).
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.stream.try_clone()?;
        Ok(Self {
            stream: cloned,
            endpoint: self.endpoint.clone(),
        })
    }

    /// Shut down both directions of the connection.
    ///
    /// Subsequent reads and writes fail; open a new session to continue.
    pub fn shutdown(&self) -> Result<()> {
        debug!(endpoint = %self.endpoint, "shutting down session");
        self.stream.shutdown(Shutdown::Both).map_err(Into::into)
    }
}

impl Read for TcpSession {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for TcpSession {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.stream.flush()
    }
}

impl std::fmt::Debug for TcpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpSession")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
