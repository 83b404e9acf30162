use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

/// Default host: the simulation host normally runs on the same machine.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port the simulation host listens on.
pub const DEFAULT_PORT: u16 = 41451;

/// A `host:port` address of a simulation host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Endpoint {
    /// Create an endpoint from explicit host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Endpoint for a host listening on the default port.
    pub fn with_host(host: impl Into<String>) -> Self {
        Self::new(host, DEFAULT_PORT)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = TransportError;

    /// Parse `host[:port]`; a missing port means the default port.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TransportError::InvalidEndpoint {
                input: input.to_string(),
                reason: "empty endpoint".to_string(),
            });
        }

        match input.rsplit_once(':') {
            Some((host, port)) => {
                if host.is_empty() {
                    return Err(TransportError::InvalidEndpoint {
                        input: input.to_string(),
                        reason: "missing host".to_string(),
                    });
                }
                let port = port.parse::<u16>().map_err(|_| {
                    TransportError::InvalidEndpoint {
                        input: input.to_string(),
                        reason: format!("invalid port '{port}'"),
                    }
                })?;
                Ok(Self::new(host, port))
            }
            None => Ok(Self::with_host(input)),
        }
    }
}
