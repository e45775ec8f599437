//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// Per-phone rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Max code requests per phone number per rolling hour
    #[serde(default = "default_per_hour")]
    pub max_per_hour: u32,

    /// Max code requests per phone number per rolling day
    #[serde(default = "default_per_day")]
    pub max_per_day: u32,

    /// Block duration in seconds once a phone exceeds twice the hourly limit
    #[serde(default = "default_block_duration")]
    pub block_duration_seconds: u64,

    /// How often the inactive-entry sweep runs, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// Entries idle longer than this many seconds are garbage-collected
    #[serde(default = "default_inactivity_ttl")]
    pub inactivity_ttl_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_per_hour: default_per_hour(),
            max_per_day: default_per_day(),
            block_duration_seconds: default_block_duration(),
            sweep_interval_seconds: default_sweep_interval(),
            inactivity_ttl_seconds: default_inactivity_ttl(),
        }
    }
}

impl RateLimitConfig {
    /// Create a development configuration (more lenient limits)
    pub fn development() -> Self {
        Self {
            max_per_hour: 10,
            max_per_day: 50,
            ..Default::default()
        }
    }

    /// Create a production configuration (stricter limits)
    pub fn production() -> Self {
        Self::default()
    }

    /// Apply `RATE_LIMIT_*` overrides on top of `base`
    pub fn from_env_or(base: Self) -> Self {
        Self {
            enabled: env_or("RATE_LIMIT_ENABLED", base.enabled),
            max_per_hour: env_or("RATE_LIMIT_MAX_PER_HOUR", base.max_per_hour),
            max_per_day: env_or("RATE_LIMIT_MAX_PER_DAY", base.max_per_day),
            block_duration_seconds: env_or(
                "RATE_LIMIT_BLOCK_SECONDS",
                base.block_duration_seconds,
            ),
            sweep_interval_seconds: env_or(
                "RATE_LIMIT_SWEEP_INTERVAL_SECONDS",
                base.sweep_interval_seconds,
            ),
            inactivity_ttl_seconds: base.inactivity_ttl_seconds,
        }
    }

    /// Attempt count above which a phone gets temporarily blocked
    pub fn block_threshold(&self) -> u32 {
        self.max_per_hour.saturating_mul(2)
    }
}

fn default_enabled() -> bool {
    true
}

fn default_per_hour() -> u32 {
    3
}

fn default_per_day() -> u32 {
    5
}

fn default_block_duration() -> u64 {
    3600 // 1 hour
}

fn default_sweep_interval() -> u64 {
    3600 // 1 hour
}

fn default_inactivity_ttl() -> u64 {
    86_400 // 24 hours
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_block_threshold() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_per_hour, 3);
        assert_eq!(config.max_per_day, 5);
        assert_eq!(config.block_threshold(), 6);
        assert_eq!(config.block_duration_seconds, 3600);
    }

    #[test]
    fn test_development_is_lenient() {
        let dev = RateLimitConfig::development();
        assert!(dev.max_per_hour > RateLimitConfig::production().max_per_hour);
    }
}
