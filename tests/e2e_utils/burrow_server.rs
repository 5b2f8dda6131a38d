#![cfg(test)]
#![allow(dead_code)]

use futures::channel::mpsc;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Span;

use burrow::adapters::TcpDialer;
use burrow::domain::{ServeError, ServerState};
use burrow::lifecycle::{self, Lifecycle};
use burrow::ports::DialerPort;
use burrow::ProxyConfig;

pub struct TestBurrowServer {
    addr: SocketAddr,
    interrupts: mpsc::UnboundedSender<()>,
    state: watch::Receiver<ServerState>,
    handle: JoinHandle<Result<(), ServeError>>,
}

impl TestBurrowServer {
    pub async fn start() -> Self {
        Self::start_with(Self::config(), Arc::new(TcpDialer::new())).await
    }

    pub fn config() -> ProxyConfig {
        ProxyConfig {
            bind: "127.0.0.1:0".to_string(),
            ..ProxyConfig::default()
        }
    }

    pub async fn start_with(config: ProxyConfig, dialer: Arc<dyn DialerPort>) -> Self {
        let server = lifecycle::start(&config, dialer, Span::none())
            .await
            .expect("Failed to bind burrow");
        let addr = server.local_addr();

        let (interrupts, stream) = mpsc::unbounded();
        let lifecycle = Lifecycle::new(Span::none());
        let state = lifecycle.subscribe();

        let handle = tokio::spawn(async move { lifecycle.run(server, stream).await });

        Self {
            addr,
            interrupts,
            state,
            handle,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    pub async fn wait_for(&mut self, wanted: ServerState) {
        tokio::time::timeout(Duration::from_secs(5), self.state.wait_for(|s| *s == wanted))
            .await
            .expect("state change should happen within 5s")
            .expect("lifecycle dropped its state");
    }

    pub fn interrupt(&self) {
        self.interrupts
            .unbounded_send(())
            .expect("lifecycle should still listen for interrupts");
    }

    /// Waits for the lifecycle to finish, keeping the interrupt channel open.
    pub async fn join(self) -> Result<(), ServeError> {
        let Self { interrupts, handle, .. } = self;
        let outcome = tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .expect("lifecycle should stop within 10s")
            .expect("lifecycle task panicked");
        drop(interrupts);
        outcome
    }
}
