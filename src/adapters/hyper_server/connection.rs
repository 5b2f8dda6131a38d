use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tracing::debug;

use super::adapter::HyperProxyAdapter;

/// Serves one accepted client connection until it closes, is upgraded into a
/// tunnel, or finishes its in-flight request after `drain` fires.
pub async fn serve_connection(stream: TcpStream, adapter: Arc<HyperProxyAdapter>, mut drain: broadcast::Receiver<()>) {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req| {
        let adapter = adapter.clone();
        async move { Ok::<_, Infallible>(adapter.handle(req).await) }
    });

    let conn = http1::Builder::new()
        .preserve_header_case(true)
        .title_case_headers(true)
        .serve_connection(io, service)
        .with_upgrades();
    tokio::pin!(conn);

    let mut draining = false;
    loop {
        tokio::select! {
            res = conn.as_mut() => {
                if let Err(err) = res {
                    debug!("connection closed with error: {}", err);
                }
                break;
            }
            _ = drain.recv(), if !draining => {
                draining = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}
