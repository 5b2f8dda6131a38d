//! Startup orchestration: listener first, so the outbound side knows which
//! address is its own, then the proxy service and the HTTP adapter.

use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::Span;

use super::server::ProxyServer;
use crate::adapters::HyperProxyAdapter;
use crate::config::ProxyConfig;
use crate::domain::ProxyService;
use crate::ports::DialerPort;

/// Wires the proxy together and binds the listener. A bind failure is the
/// only fatal startup error.
pub async fn start(config: &ProxyConfig, dialer: Arc<dyn DialerPort>, span: Span) -> io::Result<ProxyServer> {
    let listener = TcpListener::bind(config.bind.as_str()).await?;
    let local_addr = listener.local_addr()?;

    let service = ProxyService::new(dialer, config.dial_timeout(), span.clone()).with_listen_addr(local_addr);
    let adapter = Arc::new(HyperProxyAdapter::new(Arc::new(service)));

    ProxyServer::new(listener, adapter, config.drain_timeout(), span)
}
