//! # Infrastructure Layer
//!
//! Concrete collaborators for the LeadCall verification engine:
//!
//! - **Memory**: in-process code, lead and statistics stores
//! - **Cache**: Redis client and the Redis-backed code store
//! - **Database**: MySQL lead lookup and daily send statistics using SQLx
//! - **SMS**: mock, NHN Cloud and Twilio providers plus a failover decorator
//! - **Alerts**: log and webhook delivery of cost alerts
//! - **Bootstrap**: wiring everything into a `VerificationEngine` from `AppConfig`
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis caching support (default)
//! - `twilio-sms`: Enable Twilio SMS service (default)

pub mod alerts;
pub mod bootstrap;
pub mod cache;
#[cfg(feature = "mysql")]
pub mod database;
pub mod memory;
pub mod sms;

pub use bootstrap::{build_infrastructure, Infrastructure};

use lc_core::errors::DomainError;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stored payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::storage(err.to_string())
    }
}
