//! Alert entity and the notifier boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::shared::error::NotifierError;

/// A sustained-detection alert for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub client_id: String,
    pub consecutive: usize,
    /// Class of the strongest detection in the frame that fired
    pub class_id: u32,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(client_id: impl Into<String>, consecutive: usize) -> Self {
        Self {
            client_id: client_id.into(),
            consecutive,
            class_id: 0,
            raised_at: Utc::now(),
        }
    }

    pub fn with_class(mut self, class_id: u32) -> Self {
        self.class_id = class_id;
        self
    }

    /// Subject line for human-facing delivery channels.
    pub fn subject(&self) -> String {
        format!(
            "Object Detection Alert: Client {} - {} Consecutive Frames",
            self.client_id, self.consecutive
        )
    }

    /// Plain-text body for human-facing delivery channels.
    pub fn body(&self) -> String {
        format!(
            "Alert Timestamp: {}\n\
             Client ID: {}\n\
             Detection: Object (class {}) detected in {} consecutive frames.\n\
             Please check the admin panel for details.\n",
            self.raised_at.to_rfc3339(),
            self.client_id,
            self.class_id,
            self.consecutive
        )
    }
}

/// External alert sink. Best-effort; failures are the caller's to log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn notify(&self, alert: &Alert) -> Result<(), NotifierError>;
}
