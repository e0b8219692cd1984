//! Shutdown coordination for the entrypoint.

use tokio::sync::broadcast;

/// Coordinator for interrupting the run.
///
/// Signal handlers call [`Shutdown::trigger`]; the readiness wait holds a
/// receiver and gives up as soon as it fires.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
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

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once shutdown has been triggered.
///
/// A closed channel means nobody can trigger shutdown anymore, so it never
/// resolves in that case.
pub async fn triggered(rx: &mut broadcast::Receiver<()>) {
    if let Err(broadcast::error::RecvError::Closed) = rx.recv().await {
        std::future::pending::<()>().await;
    }
}
