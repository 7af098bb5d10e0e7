//! Graceful shutdown.
//!
//! The server subscribes before it starts serving. Once triggered it stops
//! accepting connections and in-flight requests run to completion, so staged
//! uploads are still cleaned up by their owning request.

use tokio::sync::broadcast;

use crate::lifecycle::signals;

#[derive(Debug, Clone)]
pub struct Shutdown {
    notify: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1);
        Self { notify }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.notify.subscribe()
    }

    /// Notify every subscriber. Returns how many were listening.
    pub fn trigger(&self) -> usize {
        self.notify.send(()).unwrap_or(0)
    }

    /// Trigger once the process receives SIGINT or SIGTERM.
    pub async fn on_signal(self) {
        signals::wait_for_signal().await;
        let listeners = self.trigger();
        tracing::info!(listeners, "Graceful shutdown triggered");
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
