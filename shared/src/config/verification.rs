//! Verification code and SMS retry configuration

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::{env_opt, env_or};

/// Code lengths the engine can generate and accept
pub const CODE_LENGTH_RANGE: RangeInclusive<usize> = 4..=9;

/// Verification code configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Number of digits in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Seconds before an issued code expires
    #[serde(default = "default_code_ttl")]
    pub code_ttl_seconds: u64,

    /// Failed submissions allowed per code
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Minimum seconds between two issued codes for the same phone
    #[serde(default = "default_min_resend_interval")]
    pub min_resend_interval_seconds: u64,

    /// Brand name placed in the SMS body
    #[serde(default = "default_brand_name")]
    pub brand_name: String,

    /// Interval of the expired-code cleanup job in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            code_ttl_seconds: default_code_ttl(),
            max_attempts: default_max_attempts(),
            min_resend_interval_seconds: default_min_resend_interval(),
            brand_name: default_brand_name(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

impl VerificationConfig {
    /// Apply `VERIFICATION_*` overrides on top of `base`
    pub fn from_env_or(base: Self) -> Self {
        Self {
            code_length: env_or("VERIFICATION_CODE_LENGTH", base.code_length),
            code_ttl_seconds: env_or("VERIFICATION_CODE_TTL_SECONDS", base.code_ttl_seconds),
            max_attempts: env_or("VERIFICATION_MAX_ATTEMPTS", base.max_attempts),
            min_resend_interval_seconds: env_or(
                "VERIFICATION_MIN_RESEND_SECONDS",
                base.min_resend_interval_seconds,
            ),
            brand_name: env_opt("VERIFICATION_BRAND_NAME").unwrap_or(base.brand_name),
            cleanup_interval_seconds: env_or(
                "VERIFICATION_CLEANUP_INTERVAL_SECONDS",
                base.cleanup_interval_seconds,
            ),
        }
    }

    /// Reject settings the engine cannot honor
    pub fn validate(&self) -> Result<(), String> {
        if !CODE_LENGTH_RANGE.contains(&self.code_length) {
            return Err(format!(
                "code_length must be between {} and {}, got {}",
                CODE_LENGTH_RANGE.start(),
                CODE_LENGTH_RANGE.end(),
                self.code_length
            ));
        }
        if self.code_ttl_seconds == 0 {
            return Err("code_ttl_seconds must be positive".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        Ok(())
    }

    /// Code lifetime in whole minutes, rounded up (used in the SMS body)
    pub fn code_ttl_minutes(&self) -> u64 {
        (self.code_ttl_seconds + 59) / 60
    }
}

/// Retry policy for SMS dispatch
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// Total send attempts, including the first one
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base delay in milliseconds; attempt `n` waits `n * base` before retrying
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Upper bound for a single backoff delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl DispatchConfig {
    /// Apply `SMS_RETRY_*` overrides on top of `base`
    pub fn from_env_or(base: Self) -> Self {
        Self {
            retry_attempts: env_or("SMS_RETRY_ATTEMPTS", base.retry_attempts).max(1),
            retry_delay_ms: env_or("SMS_RETRY_DELAY_MS", base.retry_delay_ms),
            max_delay_ms: env_or("SMS_RETRY_MAX_DELAY_MS", base.max_delay_ms),
        }
    }
}

fn default_code_length() -> usize {
    6
}

fn default_code_ttl() -> u64 {
    180 // 3 minutes
}

fn default_max_attempts() -> u32 {
    5
}

fn default_min_resend_interval() -> u64 {
    60
}

fn default_brand_name() -> String {
    String::from("LeadCall")
}

fn default_cleanup_interval() -> u64 {
    300 // 5 minutes
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    5000
}
