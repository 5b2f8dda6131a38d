use hyper::{Method, Uri};
use std::fmt;

use super::{ProxyError, Result};

/// Which handler a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Tunnel,
    Forward,
}

impl RequestKind {
    pub fn of(method: &Method) -> Self {
        if method == Method::CONNECT {
            RequestKind::Tunnel
        } else {
            RequestKind::Forward
        }
    }
}

/// A validated `host:port` destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TunnelTarget {
    host: String,
    port: u16,
}

impl TunnelTarget {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        if host.is_empty() {
            return Err(ProxyError::InvalidTarget("empty host".to_string()));
        }
        if port == 0 {
            return Err(ProxyError::InvalidTarget(format!("{}: port 0 is not dialable", host)));
        }
        url::Host::parse(host).map_err(|e| ProxyError::InvalidTarget(format!("{}: {}", host, e)))?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Parses a CONNECT authority such as `example.com:443` or `[::1]:8443`.
    pub fn parse(authority: &str) -> Result<Self> {
        let (host, port) = authority
            .rsplit_once(':')
            .ok_or_else(|| ProxyError::InvalidTarget(format!("{}: missing port", authority)))?;

        if host.starts_with('[') != host.ends_with(']') {
            return Err(ProxyError::InvalidTarget(format!("{}: unbalanced brackets", authority)));
        }

        let port = port
            .parse::<u16>()
            .map_err(|e| ProxyError::InvalidTarget(format!("{}: invalid port: {}", authority, e)))?;

        Self::new(host, port)
    }

    pub fn from_uri(uri: &Uri) -> Result<Self> {
        let authority = uri.authority().ok_or(ProxyError::MissingHost)?;
        if authority.as_str().contains('@') {
            return Err(ProxyError::InvalidTarget(format!(
                "{}: userinfo is not allowed",
                authority
            )));
        }
        Self::parse(authority.as_str())
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for TunnelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Lifecycle of the listening server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Starting,
    Serving,
    Draining,
    Stopped,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerState::Starting => write!(f, "starting"),
            ServerState::Serving => write!(f, "serving"),
            ServerState::Draining => write!(f, "draining"),
            ServerState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Bytes moved by the two pumps of one tunnel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TunnelStats {
    pub client_to_destination: u64,
    pub destination_to_client: u64,
}
