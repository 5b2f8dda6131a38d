use futures::Future;
use hyper::Uri;
use hyper_util::rt::TokioIo;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::net::TcpStream;
use tower_service::Service;

use crate::domain::{ProxyError, ProxyService, Result, TunnelTarget};

/// Connector for the forwarding client: every origin connection goes through
/// the service's bounded dial.
#[derive(Clone)]
pub struct HyperConnector {
    service: Arc<ProxyService>,
}

impl HyperConnector {
    pub fn new(service: Arc<ProxyService>) -> Self {
        Self { service }
    }
}

impl Service<Uri> for HyperConnector {
    type Response = TokioIo<TcpStream>;
    type Error = ProxyError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let target = origin_for(&uri)?;
            let stream = service.dial(&target).await?;
            log::debug!("Connected to origin {} for {}", target, uri);
            Ok(TokioIo::new(stream))
        })
    }
}

/// Origin address for a forwarded request; only plain `http` is relayed.
pub(crate) fn origin_for(uri: &Uri) -> Result<TunnelTarget> {
    match uri.scheme_str() {
        Some("http") | None => {}
        Some(other) => return Err(ProxyError::UnsupportedScheme(other.to_string())),
    }
    let host = uri.host().ok_or(ProxyError::MissingHost)?;
    TunnelTarget::new(host, uri.port_u16().unwrap_or(80))
}
