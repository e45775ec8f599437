//! HashMap-backed code store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use lc_core::domain::entities::VerificationCode;
use lc_core::errors::DomainResult;
use lc_core::repositories::CodeStore;

/// Code store kept in process memory
#[derive(Default)]
pub struct InMemoryCodeStore {
    codes: RwLock<HashMap<String, VerificationCode>>,
}

impl InMemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, expired ones included
    pub async fn len(&self) -> usize {
        self.codes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.codes.read().await.is_empty()
    }
}

#[async_trait]
impl CodeStore for InMemoryCodeStore {
    async fn put(&self, code: &VerificationCode) -> DomainResult<()> {
        self.codes
            .write()
            .await
            .insert(code.phone.clone(), code.clone());
        Ok(())
    }

    async fn get(&self, phone: &str) -> DomainResult<Option<VerificationCode>> {
        Ok(self.codes.read().await.get(phone).cloned())
    }

    async fn increment_attempts(&self, phone: &str) -> DomainResult<Option<u32>> {
        let mut codes = self.codes.write().await;
        Ok(codes.get_mut(phone).map(|code| {
            code.attempts += 1;
            code.attempts
        }))
    }

    async fn delete(&self, phone: &str) -> DomainResult<()> {
        self.codes.write().await.remove(phone);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let mut codes = self.codes.write().await;
        let before = codes.len();
        codes.retain(|_, code| !code.is_purgeable_at(now));
        Ok(before - codes.len())
    }
}
