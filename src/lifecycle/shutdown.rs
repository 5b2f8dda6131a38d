//! Shutdown coordination for the proxy.

use tokio::sync::{broadcast, oneshot};

/// Creates the single-use trigger that ends the accept loop.
pub fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = oneshot::channel();
    (
        ShutdownTrigger { tx: Some(tx) },
        ShutdownSignal { rx, detached: false },
    )
}

pub struct ShutdownTrigger {
    tx: Option<oneshot::Sender<()>>,
}

impl ShutdownTrigger {
    /// Fires the trigger. Returns `false` if it had already fired.
    pub fn fire(&mut self) -> bool {
        match self.tx.take() {
            Some(tx) => {
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.tx.is_none()
    }
}

pub struct ShutdownSignal {
    rx: oneshot::Receiver<()>,
    detached: bool,
}

impl ShutdownSignal {
    /// Resolves once the trigger fires. If the trigger is dropped without
    /// firing, this never resolves.
    pub async fn fired(&mut self) {
        if !self.detached {
            if (&mut self.rx).await.is_ok() {
                return;
            }
            self.detached = true;
        }
        std::future::pending::<()>().await
    }
}

/// Broadcast that asks every live HTTP connection to finish up.
pub struct Drain {
    tx: broadcast::Sender<()>,
}

impl Drain {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Drain {
    fn default() -> Self {
        Self::new()
    }
}
