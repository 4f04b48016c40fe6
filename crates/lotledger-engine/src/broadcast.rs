//! Change broadcaster: post-commit balance/ledger invalidation feed.
//!
//! Every execution context holding a read-cached view of balances or
//! entries subscribes here; on receipt it invalidates and reloads the
//! affected key. The service publishes only after its transaction has
//! committed, so observers can never see a value that is later rolled
//! back. A slow or absent subscriber never blocks a publisher.

use lotledger_types::StateChange;
use tokio::sync::broadcast;

/// Fan-out channel for committed state changes.
#[derive(Clone)]
pub struct ChangeBroadcaster {
    tx: broadcast::Sender<StateChange>,
}

impl ChangeBroadcaster {
    /// Create a broadcaster with the given channel capacity. Receivers
    /// that lag past the capacity observe a `Lagged` error and should
    /// resynchronize from the store.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to the change feed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.tx.subscribe()
    }

    /// Publish one committed change. A send with no live receivers is
    /// not an error; there is simply nobody to notify.
    pub fn publish(&self, change: StateChange) {
        let _ = self.tx.send(change);
    }

    /// Publish a batch of committed changes in order.
    pub fn publish_all(&self, changes: &[StateChange]) {
        for change in changes {
            self.publish(*change);
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
