//! Lead store trait for duplicate-registration checks.

use async_trait::async_trait;

use crate::errors::DomainResult;

/// Read access to previously captured leads
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Whether a lead with this normalized phone number already exists
    async fn exists(&self, phone: &str) -> DomainResult<bool>;
}
