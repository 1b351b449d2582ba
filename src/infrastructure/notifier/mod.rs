//! Alert Notifiers
//!
//! Implementations of `AlertNotifier`:
//! - `LogNotifier`: records the alert in the structured log
//! - `WebhookNotifier`: posts the alert as JSON to an HTTP endpoint

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::NotifierSettings;
use crate::domain::{Alert, AlertNotifier};
use crate::shared::error::NotifierError;

/// Writes alerts to the log only.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier {
    recipient: String,
}

impl LogNotifier {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
        }
    }
}

#[async_trait]
impl AlertNotifier for LogNotifier {
    async fn notify(&self, alert: &Alert) -> Result<(), NotifierError> {
        tracing::warn!(
            recipient = %self.recipient,
            client_id = %alert.client_id,
            consecutive = alert.consecutive,
            subject = %alert.subject(),
            "Alert raised (no webhook configured)"
        );
        Ok(())
    }
}

/// Posts alerts to a webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    recipient: String,
    sender: String,
}

/// Webhook request body
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    to: &'a str,
    from: &'a str,
    subject: String,
    body: String,
    client_id: &'a str,
    consecutive: usize,
    class_id: u32,
    raised_at: String,
}

impl WebhookNotifier {
    pub fn new(url: String, settings: &NotifierSettings) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url,
            recipient: settings.admin_email.clone(),
            sender: settings.sender.clone(),
        })
    }

    fn payload<'a>(&'a self, alert: &'a Alert) -> WebhookPayload<'a> {
        WebhookPayload {
            to: &self.recipient,
            from: &self.sender,
            subject: alert.subject(),
            body: alert.body(),
            client_id: &alert.client_id,
            consecutive: alert.consecutive,
            class_id: alert.class_id,
            raised_at: alert.raised_at.to_rfc3339(),
        }
    }
}

#[async_trait]
impl AlertNotifier for WebhookNotifier {
    async fn notify(&self, alert: &Alert) -> Result<(), NotifierError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&self.payload(alert))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifierError::Rejected(format!("{} - {}", status, body)));
        }
        Ok(())
    }
}

/// Pick the notifier described by `settings`.
pub fn build_notifier(settings: &NotifierSettings) -> Arc<dyn AlertNotifier> {
    match settings.webhook_url.as_deref().filter(|url| !url.is_empty()) {
        Some(url) => match WebhookNotifier::new(url.to_string(), settings) {
            Ok(notifier) => {
                tracing::info!(webhook_url = %url, "Alert webhook configured");
                Arc::new(notifier)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to build alert webhook, falling back to log");
                Arc::new(LogNotifier::new(settings.admin_email.clone()))
            }
        },
        None => Arc::new(LogNotifier::new(settings.admin_email.clone())),
    }
}
