//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical business areas:
//! - `environment` - Environment detection and logging configuration
//! - `verification` - Code generation, expiry, attempts and SMS retry policy
//! - `rate_limit` - Per-phone request throttling and temporary blocks
//! - `cost` - Duplicate-send window, daily/monthly caps and alerting
//! - `sms` - SMS provider selection and credentials
//! - `storage` - Code/lead/stats storage backend selection
//! - `server` - HTTP server configuration

pub mod cost;
pub mod environment;
pub mod rate_limit;
pub mod server;
pub mod sms;
pub mod storage;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export commonly used types
pub use cost::{AlertConfig, CostConfig};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
pub use sms::{NhnCloudCredentials, SmsConfig, SmsProvider, TwilioCredentials};
pub use storage::{StorageBackend, StorageConfig};
pub use verification::{DispatchConfig, VerificationConfig, CODE_LENGTH_RANGE};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Verification code configuration
    pub verification: VerificationConfig,

    /// SMS retry policy
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Cost control configuration
    pub cost: CostConfig,

    /// SMS provider configuration
    pub sms: SmsConfig,

    /// Storage backend configuration
    pub storage: StorageConfig,

    /// Alert delivery configuration
    #[serde(default)]
    pub alert: AlertConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            verification: VerificationConfig::default(),
            dispatch: DispatchConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cost: CostConfig::default(),
            sms: SmsConfig::default(),
            storage: StorageConfig::default(),
            alert: AlertConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            rate_limit: RateLimitConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
            ..Default::default()
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::new("0.0.0.0", 8080),
            rate_limit: RateLimitConfig::production(),
            storage: StorageConfig::production(),
            logging: LoggingConfig::for_environment(Environment::Production),
            ..Default::default()
        }
    }

    /// Load configuration from environment
    ///
    /// Starts from the preset for the detected environment and lets individual
    /// environment variables override each section.
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let preset = match environment {
            Environment::Production => Self::production(),
            Environment::Development | Environment::Staging => Self::development(),
        };

        Self {
            environment,
            server: ServerConfig::from_env_or(preset.server),
            verification: VerificationConfig::from_env_or(preset.verification),
            dispatch: DispatchConfig::from_env_or(preset.dispatch),
            rate_limit: RateLimitConfig::from_env_or(preset.rate_limit),
            cost: CostConfig::from_env_or(preset.cost),
            sms: SmsConfig::from_env_or(preset.sms),
            storage: StorageConfig::from_env_or(preset.storage),
            alert: AlertConfig::from_env(),
            logging: LoggingConfig::from_env_or(LoggingConfig::for_environment(environment)),
        }
    }

    /// Check cross-field constraints that parsing alone cannot enforce
    pub fn validate(&self) -> Result<(), String> {
        self.verification
            .validate()
            .map_err(|e| format!("verification: {}", e))
    }

    /// Whether generated codes may be echoed back to callers
    pub fn expose_demo_code(&self) -> bool {
        !self.environment.is_production()
    }
}

/// Read and parse an environment variable, falling back to `default`
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read an optional, non-empty environment variable
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
