//! MySQL lead lookup
//!
//! Leads are written by the chatbot backend; this side only asks whether a
//! phone is already registered. Phones are stored hashed, never in clear.

use async_trait::async_trait;
use lc_shared::phone::{mask_phone_number, normalize_phone_number};
use sha2::{Digest, Sha256};
use sqlx::MySqlPool;

use lc_core::errors::{DomainError, DomainResult};
use lc_core::repositories::LeadStore;

/// `LeadStore` over the `leads` table
pub struct MySqlLeadStore {
    pool: MySqlPool,
}

impl MySqlLeadStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// SHA-256 of the normalized phone, lowercase hex
    pub fn hash_phone(phone: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(normalize_phone_number(phone).as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[async_trait]
impl LeadStore for MySqlLeadStore {
    async fn exists(&self, phone: &str) -> DomainResult<bool> {
        let found: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM leads WHERE phone_hash = ? LIMIT 1")
                .bind(Self::hash_phone(phone))
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(
                        phone = %mask_phone_number(phone),
                        error = %e,
                        "Lead lookup failed"
                    );
                    DomainError::storage(format!("Lead lookup failed: {}", e))
                })?;

        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_ignores_formatting() {
        let plain = MySqlLeadStore::hash_phone("01012345678");
        assert_eq!(plain, MySqlLeadStore::hash_phone("010-1234-5678"));
        assert_ne!(plain, MySqlLeadStore::hash_phone("01012345679"));
        assert_eq!(plain.len(), 64);
        assert!(plain.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
