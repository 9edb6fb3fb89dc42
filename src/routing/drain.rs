//! In-flight request accounting.
//!
//! A `watch` channel carries the live count so a drain can wait for zero
//! without polling.

use std::sync::Arc;

use tokio::sync::watch;

/// Counter of requests currently inside the router.
#[derive(Clone)]
pub struct InFlight {
    count: Arc<watch::Sender<usize>>,
}

impl InFlight {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            count: Arc::new(tx),
        }
    }

    /// Mark a request as started. The count drops when the guard does.
    pub fn enter(&self) -> InFlightGuard {
        self.count.send_modify(|n| *n += 1);
        InFlightGuard {
            count: Arc::clone(&self.count),
        }
    }

    pub fn current(&self) -> usize {
        *self.count.borrow()
    }

    /// Resolve once no request is in flight.
    pub async fn drained(&self) {
        let mut rx = self.count.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight count on drop.
pub struct InFlightGuard {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.count.send_modify(|n| *n = n.saturating_sub(1));
    }
}
