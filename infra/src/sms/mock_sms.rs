//! Mock SMS provider
//!
//! Logs messages instead of sending them. Used in development and by
//! the `mock` provider setting.

use async_trait::async_trait;
use lc_shared::phone::{is_valid_korean_mobile, mask_phone_number};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};
use uuid::Uuid;

use lc_core::services::dispatch::{SmsError, SmsSender};

/// SMS sender that only logs
#[derive(Default)]
pub struct MockSmsSender {
    message_count: AtomicU64,
}

impl MockSmsSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages "sent" so far
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SmsSender for MockSmsSender {
    async fn send(&self, phone: &str, message: &str) -> Result<String, SmsError> {
        if !is_valid_korean_mobile(phone) {
            return Err(SmsError::InvalidRecipient(mask_phone_number(phone)));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            provider = "mock",
            phone = %mask_phone_number(phone),
            message_id = %message_id,
            message_length = message.chars().count(),
            count = count,
            "SMS sent (mock)"
        );
        debug!(provider = "mock", body = %message, "Mock SMS body");

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
