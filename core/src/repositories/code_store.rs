//! Code store trait defining persistence for outstanding verification codes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::VerificationCode;
use crate::errors::DomainResult;

/// Keyed storage for at most one outstanding code per phone
///
/// Implementations must be safe for concurrent use. The engine already
/// serializes work per phone, so operations on one key never race each
/// other from the engine's side.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Store `code`, replacing any record for the same phone
    ///
    /// # Arguments
    /// * `code` - Record to store; its `expires_at` may be used as a storage TTL
    ///
    /// # Returns
    /// * `Ok(())` - Record stored
    /// * `Err(DomainError)` - Backend unavailable
    async fn put(&self, code: &VerificationCode) -> DomainResult<()>;

    /// Fetch the record for `phone`, if any
    async fn get(&self, phone: &str) -> DomainResult<Option<VerificationCode>>;

    /// Count one failed submission
    ///
    /// # Returns
    /// * `Ok(Some(n))` - The attempt count after incrementing
    /// * `Ok(None)` - No record exists for `phone`
    async fn increment_attempts(&self, phone: &str) -> DomainResult<Option<u32>>;

    /// Remove the record for `phone`; removing a missing record is not an error
    async fn delete(&self, phone: &str) -> DomainResult<()>;

    /// Remove every record past its expiry by more than
    /// `EXPIRED_RETENTION_SECONDS` at `now`
    ///
    /// Backends with native key expiry may return `Ok(0)`.
    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize>;
}
