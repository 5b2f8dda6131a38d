use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::domain::{ProxyError, Result, TunnelTarget};
use crate::ports::DialerPort;

/// Direct TCP dialer, resolving names with the system resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

impl TcpDialer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DialerPort for TcpDialer {
    async fn dial(&self, target: &TunnelTarget) -> Result<TcpStream> {
        let stream = TcpStream::connect((target.host().trim_matches(|c| c == '[' || c == ']'), target.port()))
            .await
            .map_err(|e| ProxyError::DialFailed {
                target: target.to_string(),
                reason: e.to_string(),
            })?;

        if let Err(e) = stream.set_nodelay(true) {
            log::debug!("Failed to set TCP_NODELAY for {}: {}", target, e);
        }

        Ok(stream)
    }
}
