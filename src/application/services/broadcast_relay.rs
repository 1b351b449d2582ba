//! Broadcast Relay
//!
//! Fans processed frames and alerts out to the admin audience. Each
//! subscriber gets a small bounded channel; delivery uses `try_send`, so a
//! slow subscriber loses events instead of slowing the producer path or the
//! other subscribers. Nothing is retained for subscribers that join later.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::application::dto::ServerEvent;
use crate::infrastructure::metrics;

/// Receiving end handed to a subscriber
pub type Subscription = mpsc::Receiver<Arc<ServerEvent>>;

/// Per-publish delivery tally
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    /// Subscriber buffer was full
    pub dropped: usize,
    /// Subscriber had gone away and was removed
    pub pruned: usize,
}

/// Subscriber set plus fan-out
pub struct BroadcastRelay {
    subscribers: DashMap<String, mpsc::Sender<Arc<ServerEvent>>>,
    buffer: usize,
}

impl BroadcastRelay {
    /// Create a relay with `buffer` pending events per subscriber.
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: DashMap::new(),
            buffer: buffer.max(1),
        }
    }

    /// Join the audience. Returns `None` if `consumer_id` is already
    /// subscribed; its existing subscription keeps receiving.
    pub fn subscribe(&self, consumer_id: &str) -> Option<Subscription> {
        let rx = match self.subscribers.entry(consumer_id.to_string()) {
            Entry::Occupied(mut entry) => {
                if !entry.get().is_closed() {
                    return None;
                }
                // Stale sender from a dropped receiver: replace it.
                let (tx, rx) = mpsc::channel(self.buffer);
                entry.insert(tx);
                rx
            }
            Entry::Vacant(entry) => {
                let (tx, rx) = mpsc::channel(self.buffer);
                entry.insert(tx);
                rx
            }
        };

        metrics::set_active_subscribers(self.subscribers.len());
        tracing::info!(consumer_id = %consumer_id, "Subscriber joined");
        Some(rx)
    }

    /// Leave the audience. Idempotent.
    pub fn unsubscribe(&self, consumer_id: &str) -> bool {
        let removed = self.subscribers.remove(consumer_id).is_some();
        if removed {
            metrics::set_active_subscribers(self.subscribers.len());
            tracing::info!(consumer_id = %consumer_id, "Subscriber left");
        }
        removed
    }

    pub fn is_subscribed(&self, consumer_id: &str) -> bool {
        self.subscribers.contains_key(consumer_id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver `event` to every current subscriber, best effort.
    pub fn publish(&self, event: ServerEvent) -> PublishReport {
        let event = Arc::new(event);
        let mut report = PublishReport::default();
        let mut gone = Vec::new();

        for entry in self.subscribers.iter() {
            match entry.value().try_send(Arc::clone(&event)) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    tracing::debug!(
                        consumer_id = %entry.key(),
                        event = event.event_name(),
                        "Subscriber lagging, event dropped"
                    );
                }
                Err(TrySendError::Closed(_)) => gone.push(entry.key().clone()),
            }
        }

        for consumer_id in gone {
            // Only prune if the entry was not replaced by a fresh subscription.
            if self
                .subscribers
                .remove_if(&consumer_id, |_, tx| tx.is_closed())
                .is_some()
            {
                report.pruned += 1;
            }
        }
        if report.pruned > 0 {
            metrics::set_active_subscribers(self.subscribers.len());
        }

        report
    }
}
