//! Shared utilities and common types for the LeadCall server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types (verification, rate limiting, cost control, SMS, storage)
//! - Error response structures
//! - Utility functions (phone normalization, validation and masking)
//! - Common API response wrappers

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AlertConfig, AppConfig, CostConfig, DispatchConfig, Environment, LoggingConfig,
    RateLimitConfig, ServerConfig, SmsConfig, SmsProvider, StorageBackend, StorageConfig,
    VerificationConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{HealthResponse, HealthStatus, ServiceHealth};
pub use utils::phone;
