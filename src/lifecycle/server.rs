use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, debug_span, error, info, Instrument, Span};

use super::shutdown::{Drain, ShutdownSignal};
use crate::adapters::hyper_server::{serve_connection, HyperProxyAdapter};
use crate::domain::{ServeError, ShutdownError};
use crate::ports::ListenerPort;

/// Owns the listening socket and every live HTTP connection task.
pub struct ProxyServer {
    listener: Option<Box<dyn ListenerPort>>,
    local_addr: SocketAddr,
    adapter: Arc<HyperProxyAdapter>,
    connections: JoinSet<()>,
    drain: Drain,
    drain_timeout: Duration,
    span: Span,
}

impl ProxyServer {
    pub fn new(
        listener: impl ListenerPort + 'static,
        adapter: Arc<HyperProxyAdapter>,
        drain_timeout: Duration,
        span: Span,
    ) -> io::Result<Self> {
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener: Some(Box::new(listener)),
            local_addr,
            adapter,
            connections: JoinSet::new(),
            drain: Drain::new(),
            drain_timeout,
            span,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn open_connections(&self) -> usize {
        self.connections.len()
    }

    /// Accepts connections until `shutdown` fires or accepting fails, then
    /// closes the listener. Always returns the reason it stopped.
    pub async fn serve(&mut self, shutdown: &mut ShutdownSignal) -> ServeError {
        let listener = match self.listener.as_ref() {
            Some(listener) => listener,
            None => return ServeError::Closed,
        };
        info!(parent: &self.span, address = %self.local_addr, "listening");

        let stopped = loop {
            tokio::select! {
                _ = shutdown.fired() => break ServeError::Closed,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(parent: &self.span, %peer, "accepted connection");
                        let span = debug_span!(parent: &self.span, "conn", %peer);
                        self.connections.spawn(
                            serve_connection(stream, self.adapter.clone(), self.drain.subscribe()).instrument(span),
                        );
                    }
                    Err(e) if is_per_connection(&e) => {
                        debug!(parent: &self.span, error = %e, "accept failed for one connection");
                    }
                    Err(e) => break ServeError::Failed(e),
                },
                Some(joined) = self.connections.join_next(), if !self.connections.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            error!(parent: &self.span, "connection task panicked: {}", e);
                        }
                    }
                }
            }
        };

        self.listener = None;
        stopped
    }

    /// Asks every open HTTP connection to finish its current request and
    /// waits for them, up to the drain timeout. Hijacked tunnels are not
    /// tracked here and keep running.
    pub async fn drain(&mut self) -> Result<(), ShutdownError> {
        self.drain.trigger();
        info!(parent: &self.span, connections = self.open_connections(), "draining");

        let connections = &mut self.connections;
        let drained = timeout(self.drain_timeout, async {
            while connections.join_next().await.is_some() {}
        })
        .await;

        match drained {
            Ok(()) => Ok(()),
            Err(_) => Err(ShutdownError::DrainTimeout {
                remaining: self.open_connections(),
                after: self.drain_timeout,
            }),
        }
    }
}

fn is_per_connection(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
    )
}
