use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn, Span};

use super::{ProxyError, Result, TunnelTarget};
use crate::ports::DialerPort;

/// Shared outbound side of the proxy: every tunnel and every forwarded request
/// reaches its destination through `dial`.
#[derive(Clone)]
pub struct ProxyService {
    dialer: Arc<dyn DialerPort>,
    dial_timeout: Duration,
    listen_addr: Option<SocketAddr>,
    span: Span,
}

impl ProxyService {
    pub fn new(dialer: Arc<dyn DialerPort>, dial_timeout: Duration, span: Span) -> Self {
        Self {
            dialer,
            dial_timeout,
            listen_addr: None,
            span,
        }
    }

    /// Address the proxy itself accepts clients on. Dials that land back on
    /// it are refused with `LoopDetected`.
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = Some(addr);
        self
    }

    pub fn dial_timeout(&self) -> Duration {
        self.dial_timeout
    }

    /// Logging context injected at construction.
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub async fn dial(&self, target: &TunnelTarget) -> Result<TcpStream> {
        debug!(parent: &self.span, %target, "dialing destination");

        match timeout(self.dial_timeout, self.dialer.dial(target)).await {
            Ok(Ok(stream)) if self.is_own_listener(&stream) => {
                warn!(parent: &self.span, %target, "destination is this proxy, refusing");
                Err(ProxyError::LoopDetected {
                    target: target.to_string(),
                })
            }
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => {
                warn!(parent: &self.span, %target, error = %e, "dial failed");
                Err(e)
            }
            Err(_) => {
                warn!(parent: &self.span, %target, timeout = ?self.dial_timeout, "dial timed out");
                Err(ProxyError::DialTimeout {
                    target: target.to_string(),
                    after: self.dial_timeout,
                })
            }
        }
    }

    fn is_own_listener(&self, stream: &TcpStream) -> bool {
        let (Some(listen), Ok(peer)) = (self.listen_addr, stream.peer_addr()) else {
            return false;
        };
        if peer.port() != listen.port() {
            return false;
        }
        if listen.ip().is_unspecified() {
            // Wildcard bind: any of our own interfaces on that port is us.
            return stream.local_addr().map(|local| local.ip() == peer.ip()).unwrap_or(false);
        }
        peer.ip() == listen.ip()
    }
}
