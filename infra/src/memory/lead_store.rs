//! Set-backed lead store

use async_trait::async_trait;
use lc_shared::phone::normalize_phone_number;
use std::collections::HashSet;
use tokio::sync::RwLock;

use lc_core::errors::DomainResult;
use lc_core::repositories::LeadStore;

/// Lead registry kept in process memory
#[derive(Default)]
pub struct InMemoryLeadStore {
    phones: RwLock<HashSet<String>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `phone` as an existing lead
    pub async fn register(&self, phone: &str) {
        self.phones
            .write()
            .await
            .insert(normalize_phone_number(phone));
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn exists(&self, phone: &str) -> DomainResult<bool> {
        Ok(self
            .phones
            .read()
            .await
            .contains(&normalize_phone_number(phone)))
    }
}
