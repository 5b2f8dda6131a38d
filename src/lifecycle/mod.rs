//! Lifecycle management.
//!
//! ```text
//! Starting ──bind──▶ Serving ──interrupt──▶ Draining ──drained/timeout──▶ Stopped
//! ```
//!
//! The first interrupt fires the one-shot shutdown trigger; the accept loop
//! then returns `ServeError::Closed`. Later interrupts are logged and ignored.

pub mod server;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use server::ProxyServer;
pub use startup::start;

use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn, Span};

use crate::domain::{ServeError, ServerState};
use shutdown::ShutdownTrigger;

pub struct Lifecycle {
    state: Arc<watch::Sender<ServerState>>,
    span: Span,
}

impl Lifecycle {
    pub fn new(span: Span) -> Self {
        let (state, _) = watch::channel(ServerState::Starting);
        Self {
            state: Arc::new(state),
            span,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Serves until the first item of `interrupts` (or an accept failure),
    /// drains, and stops. Only a failed accept loop is returned as an error;
    /// drain problems are logged.
    pub async fn run<S>(&self, mut server: ProxyServer, interrupts: S) -> Result<(), ServeError>
    where
        S: Stream<Item = ()> + Send + 'static,
    {
        let (trigger, mut shutdown) = shutdown::channel();
        self.state.send_replace(ServerState::Serving);

        let watcher = tokio::spawn(watch_interrupts(
            Box::pin(interrupts),
            trigger,
            self.state.clone(),
            self.span.clone(),
        ));

        let stopped = server.serve(&mut shutdown).await;
        match &stopped {
            ServeError::Closed => info!(parent: &self.span, "stopped accepting connections"),
            ServeError::Failed(e) => error!(parent: &self.span, "Server error: {}", e),
        }

        self.state.send_replace(ServerState::Draining);
        match server.drain().await {
            Ok(()) => info!(parent: &self.span, "Shutdown successful"),
            Err(e) => error!(parent: &self.span, "Shutdown error: {}", e),
        }

        self.state.send_replace(ServerState::Stopped);
        watcher.abort();

        match stopped {
            ServeError::Closed => Ok(()),
            failed => Err(failed),
        }
    }
}

async fn watch_interrupts<S>(
    mut interrupts: S,
    mut trigger: ShutdownTrigger,
    state: Arc<watch::Sender<ServerState>>,
    span: Span,
) where
    S: Stream<Item = ()> + Unpin,
{
    while interrupts.next().await.is_some() {
        if trigger.fire() {
            warn!(parent: &span, "Received interrupt - shutting down...");
            state.send_replace(ServerState::Draining);
        } else {
            warn!(parent: &span, "Received interrupt while draining - already shutting down");
        }
    }
}
