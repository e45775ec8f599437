//! Failover SMS sender
//!
//! Wraps a primary and a backup provider. When the primary fails with a
//! retryable error, sends move to the backup until `failover_timeout` has
//! passed, after which the primary is tried again.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{error, info, warn};

use lc_core::services::dispatch::{SmsError, SmsSender};

#[derive(Debug, Default)]
struct FailoverState {
    using_backup: bool,
    last_primary_failure: Option<Instant>,
    primary_failure_count: u32,
}

/// SMS sender with automatic failover
pub struct FailoverSmsSender {
    primary: Arc<dyn SmsSender>,
    backup: Arc<dyn SmsSender>,
    state: RwLock<FailoverState>,
    // Provider that handled the most recent send
    last_used_backup: AtomicBool,
    failover_timeout: Duration,
}

impl FailoverSmsSender {
    pub fn new(primary: Arc<dyn SmsSender>, backup: Arc<dyn SmsSender>, failover_timeout: Duration) -> Self {
        info!(
            primary = primary.provider_name(),
            backup = backup.provider_name(),
            "Failover SMS sender initialized"
        );

        Self {
            primary,
            backup,
            state: RwLock::new(FailoverState::default()),
            last_used_backup: AtomicBool::new(false),
            failover_timeout,
        }
    }

    /// Whether sends currently go to the backup
    pub async fn is_using_backup(&self) -> bool {
        self.state.read().await.using_backup
    }

    async fn should_try_primary(&self) -> bool {
        let state = self.state.read().await;
        if !state.using_backup {
            return true;
        }
        state
            .last_primary_failure
            .map_or(true, |failed_at| failed_at.elapsed() >= self.failover_timeout)
    }

    async fn record_primary_failure(&self) {
        let mut state = self.state.write().await;
        state.primary_failure_count += 1;
        state.last_primary_failure = Some(Instant::now());

        if !state.using_backup {
            warn!(
                primary = self.primary.provider_name(),
                backup = self.backup.provider_name(),
                event = "sms_failover",
                "Primary SMS provider failed, switching to backup"
            );
            state.using_backup = true;
        }
    }

    async fn record_primary_success(&self) {
        let mut state = self.state.write().await;
        if state.using_backup {
            info!(
                primary = self.primary.provider_name(),
                failures = state.primary_failure_count,
                event = "sms_failback",
                "Primary SMS provider recovered"
            );
        }
        *state = FailoverState::default();
    }

    async fn send_via_backup(&self, phone: &str, message: &str) -> Result<String, SmsError> {
        self.last_used_backup.store(true, Ordering::SeqCst);
        self.backup.send(phone, message).await.map_err(|e| {
            error!(
                backup = self.backup.provider_name(),
                error = %e,
                "Backup SMS provider failed"
            );
            e
        })
    }
}

#[async_trait]
impl SmsSender for FailoverSmsSender {
    async fn send(&self, phone: &str, message: &str) -> Result<String, SmsError> {
        if !self.should_try_primary().await {
            return self.send_via_backup(phone, message).await;
        }

        self.last_used_backup.store(false, Ordering::SeqCst);
        match self.primary.send(phone, message).await {
            Ok(message_id) => {
                self.record_primary_success().await;
                Ok(message_id)
            }
            // The backup would reject the same request
            Err(e) if !e.is_retryable() => Err(e),
            Err(e) => {
                error!(
                    primary = self.primary.provider_name(),
                    error = %e,
                    "Primary SMS provider failed"
                );
                self.record_primary_failure().await;
                self.send_via_backup(phone, message).await
            }
        }
    }

    async fn health_check(&self) -> bool {
        self.primary.health_check().await || self.backup.health_check().await
    }

    fn provider_name(&self) -> &str {
        if self.last_used_backup.load(Ordering::SeqCst) {
            self.backup.provider_name()
        } else {
            self.primary.provider_name()
        }
    }
}
