//! Shutdown coordination for the gateway.
//!
//! One [`Shutdown`] is created at startup and cloned into whatever needs to
//! stop: the signal listener, the HTTP server and its background tasks. The
//! first `trigger` wins; later calls are no-ops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::lifecycle::signals::wait_for_signal;

#[derive(Clone)]
pub struct Shutdown {
    notify: broadcast::Sender<()>,
    fired: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1);
        Self {
            notify,
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Receiver for the server's graceful-shutdown future.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.notify.subscribe()
    }

    /// Fire the shutdown. Returns `false` if it had already fired.
    pub fn trigger(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        let listeners = self.notify.send(()).unwrap_or(0);
        tracing::info!(listeners, "Gateway shutdown triggered");
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Resolve once shutdown fires, immediately if it already has.
    pub async fn triggered(&self) {
        let mut rx = self.notify.subscribe();
        if self.is_triggered() {
            return;
        }
        let _ = rx.recv().await;
    }

    /// Trigger on SIGINT/SIGTERM.
    pub fn trigger_on_signal(&self) -> JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = wait_for_signal() => {
                    shutdown.trigger();
                }
                _ = shutdown.triggered() => {}
            }
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
