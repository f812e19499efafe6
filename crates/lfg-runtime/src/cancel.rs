//! Deadline-scoped cancellation.
//!
//! A `CancelHandle` / `CancelSignal` pair wraps a `watch` channel carrying
//! a single "cancelled" flag. Every run and every pending admission holds a
//! clone of the signal, so one `cancel()` reaches all of them.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Create a connected cancel handle and signal.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

/// The triggering side.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Spawn a watchdog that fires this handle once `after` has elapsed.
    ///
    /// Abort the returned task to disarm it.
    pub fn arm_deadline(self, after: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            info!(deadline_secs = after.as_secs(), "deadline reached, cancelling outstanding runs");
            self.cancel();
        })
    }
}

/// The observing side. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the signal has fired.
    ///
    /// If every handle is dropped without firing, this never resolves.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
