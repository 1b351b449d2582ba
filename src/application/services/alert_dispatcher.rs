//! Alert Dispatcher
//!
//! Hands alerts to a background worker that calls the external notifier.
//! The frame path only enqueues; it never waits for delivery and never sees
//! delivery errors.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::domain::{Alert, AlertNotifier};
use crate::infrastructure::metrics;

/// Enqueue side of the notification worker
#[derive(Clone)]
pub struct AlertDispatcher {
    tx: mpsc::Sender<Alert>,
}

impl AlertDispatcher {
    /// Spawn the notification worker on the current runtime.
    ///
    /// The worker exits once every dispatcher clone has been dropped and the
    /// queue is drained.
    pub fn spawn(notifier: Arc<dyn AlertNotifier>, queue_capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let worker = tokio::spawn(run_worker(notifier, rx));
        (Self { tx }, worker)
    }

    /// Queue an alert for delivery. Returns `false` if it was dropped
    /// because the queue is full or the worker is gone.
    pub fn dispatch(&self, alert: Alert) -> bool {
        match self.tx.try_send(alert) {
            Ok(()) => true,
            Err(TrySendError::Full(alert)) => {
                metrics::record_alert("queue_full");
                tracing::warn!(
                    client_id = %alert.client_id,
                    "Alert queue full, notification dropped"
                );
                false
            }
            Err(TrySendError::Closed(alert)) => {
                metrics::record_alert("worker_gone");
                tracing::error!(
                    client_id = %alert.client_id,
                    "Alert worker stopped, notification dropped"
                );
                false
            }
        }
    }
}

async fn run_worker(notifier: Arc<dyn AlertNotifier>, mut rx: mpsc::Receiver<Alert>) {
    while let Some(alert) = rx.recv().await {
        match notifier.notify(&alert).await {
            Ok(()) => {
                metrics::record_alert("delivered");
                tracing::info!(
                    client_id = %alert.client_id,
                    consecutive = alert.consecutive,
                    "Alert notification sent"
                );
            }
            Err(e) => {
                metrics::record_alert("failed");
                tracing::error!(
                    client_id = %alert.client_id,
                    error = %e,
                    "Failed to send alert notification"
                );
            }
        }
    }
    tracing::debug!("Alert worker stopped");
}
