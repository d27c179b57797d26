use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use serde::Serialize;
use strum::{AsRefStr, Display};
use tokio::sync::broadcast;

#[derive(Display, AsRefStr, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Topic {
    Orders,
    Inventory,
    Notifications,
    Promotions,
}

/// A committed mutation. `seq` grows monotonically so a client receiving
/// events out of order or twice keeps only the newest and refetches.
#[derive(Clone, Debug, Serialize)]
pub struct Change {
    pub seq: u64,
    pub topic: Topic,
    pub id: String,
}

#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<Change>,
    seq: Arc<AtomicU64>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);

        Self {
            sender,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Announces a change. Must only be called after the transaction
    /// carrying it has committed.
    pub fn publish(&self, topic: Topic, id: impl Into<String>) -> u64 {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let change = Change {
            seq,
            topic,
            id: id.into(),
        };

        if self.sender.send(change).is_err() {
            tracing::trace!(seq, %topic, "no change listeners");
        }

        seq
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.sender.subscribe()
    }

    pub fn last_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }
}
