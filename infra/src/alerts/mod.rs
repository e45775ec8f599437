//! Operator alert delivery
//!
//! Cost alerts are always logged. When a webhook URL is configured they are
//! also posted as a Slack-compatible `{"text": ...}` payload on a background
//! task, so a slow webhook never delays an SMS send.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use lc_core::services::cost::{AlertKind, AlertSink};
use lc_shared::AlertConfig;

use crate::InfrastructureError;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Writes alerts to the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingAlertSink;

#[async_trait]
impl AlertSink for LoggingAlertSink {
    async fn notify(&self, kind: AlertKind, message: &str) {
        warn!(alert = %kind, event = "cost_alert", "{}", message);
    }
}

/// Logs alerts and posts them to an incoming webhook
#[derive(Clone)]
pub struct WebhookAlertSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookAlertSink {
    pub fn new(url: impl Into<String>) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Post one alert and wait for the reply
    pub async fn deliver(&self, kind: AlertKind, message: &str) -> Result<(), InfrastructureError> {
        self.client
            .post(&self.url)
            .json(&json!({ "text": format!("[{}] {}", kind, message) }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    async fn notify(&self, kind: AlertKind, message: &str) {
        LoggingAlertSink.notify(kind, message).await;

        let sink = self.clone();
        let message = message.to_string();
        tokio::spawn(async move {
            if let Err(e) = sink.deliver(kind, &message).await {
                error!(alert = %kind, error = %e, "Alert webhook delivery failed");
            }
        });
    }
}

/// Webhook sink when a URL is configured, log-only otherwise
pub fn create_alert_sink(config: &AlertConfig) -> Result<Arc<dyn AlertSink>, InfrastructureError> {
    match config.webhook_url.as_deref().filter(|url| !url.is_empty()) {
        Some(url) => Ok(Arc::new(WebhookAlertSink::new(url)?)),
        None => Ok(Arc::new(LoggingAlertSink)),
    }
}
