//! Code store backed by Redis

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lc_shared::phone::mask_phone_number;
use tracing::{debug, warn};

use lc_core::domain::entities::{VerificationCode, EXPIRED_RETENTION_SECONDS};
use lc_core::errors::DomainResult;
use lc_core::repositories::CodeStore;

use crate::cache::RedisClient;

/// Stores each code as a JSON document with a native Redis TTL
#[derive(Clone)]
pub struct RedisCodeStore {
    client: RedisClient,
}

impl RedisCodeStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn code_key(&self, phone: &str) -> String {
        self.client.key(&code_key_suffix(phone))
    }
}

fn code_key_suffix(phone: &str) -> String {
    format!("verification:code:{}", phone)
}

/// TTL for a freshly issued record
fn storage_ttl_seconds(code: &VerificationCode) -> u64 {
    let lifetime = (code.expires_at - code.created_at).num_seconds().max(1);
    (lifetime + EXPIRED_RETENTION_SECONDS) as u64
}

#[async_trait]
impl CodeStore for RedisCodeStore {
    async fn put(&self, code: &VerificationCode) -> DomainResult<()> {
        let json = serde_json::to_string(code)?;
        self.client
            .set_with_expiry(&self.code_key(&code.phone), &json, storage_ttl_seconds(code))
            .await?;

        debug!(
            phone = %mask_phone_number(&code.phone),
            expires_at = %code.expires_at,
            "Stored verification code in Redis"
        );
        Ok(())
    }

    async fn get(&self, phone: &str) -> DomainResult<Option<VerificationCode>> {
        match self.client.get(&self.code_key(phone)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn increment_attempts(&self, phone: &str) -> DomainResult<Option<u32>> {
        let key = self.code_key(phone);
        let Some(json) = self.client.get(&key).await? else {
            return Ok(None);
        };

        let mut code: VerificationCode = serde_json::from_str(&json)?;
        code.attempts += 1;

        if self
            .client
            .replace_keep_ttl(&key, &serde_json::to_string(&code)?)
            .await?
        {
            Ok(Some(code.attempts))
        } else {
            warn!(
                phone = %mask_phone_number(phone),
                "Verification code expired while counting an attempt"
            );
            Ok(None)
        }
    }

    async fn delete(&self, phone: &str) -> DomainResult<()> {
        self.client.delete(&self.code_key(phone)).await?;
        Ok(())
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> DomainResult<usize> {
        // Redis expires keys itself
        Ok(0)
    }
}
