use crate::domain::{Result, TunnelTarget};
use async_trait::async_trait;
use tokio::net::TcpStream;

/// Port for opening raw TCP connections to a destination
#[async_trait]
pub trait DialerPort: Send + Sync {
    /// Open a TCP connection to `target`
    ///
    /// Implementations do not bound the connect time themselves; the caller
    /// wraps the call in its configured dial timeout.
    async fn dial(&self, target: &TunnelTarget) -> Result<TcpStream>;
}
