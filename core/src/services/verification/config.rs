//! Configuration for the verification engine

use chrono::Duration;
use lc_shared::{AppConfig, VerificationConfig};

/// Configuration for the verification engine
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Number of digits in a generated code
    pub code_length: usize,
    /// Code validity in seconds
    pub code_ttl_seconds: u64,
    /// Failed submissions allowed per code
    pub max_attempts: u32,
    /// Minimum age of the current code before a new one may be issued
    pub min_resend_interval_seconds: u64,
    /// Brand shown in the SMS body
    pub brand_name: String,
    /// Include the generated code in responses (never in production)
    pub expose_demo_code: bool,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self::from_settings(&VerificationConfig::default(), false)
    }
}

impl VerificationServiceConfig {
    /// Build from the code settings and the demo-code switch
    pub fn from_settings(settings: &VerificationConfig, expose_demo_code: bool) -> Self {
        Self {
            code_length: settings.code_length,
            code_ttl_seconds: settings.code_ttl_seconds,
            max_attempts: settings.max_attempts,
            min_resend_interval_seconds: settings.min_resend_interval_seconds,
            brand_name: settings.brand_name.clone(),
            expose_demo_code,
        }
    }

    /// Build from the application configuration; demo codes follow the environment
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::from_settings(&config.verification, config.expose_demo_code())
    }

    pub fn code_ttl(&self) -> Duration {
        Duration::seconds(self.code_ttl_seconds as i64)
    }

    pub fn min_resend_interval(&self) -> Duration {
        Duration::seconds(self.min_resend_interval_seconds as i64)
    }

    /// Code validity in whole minutes, rounded up, for the SMS body
    pub fn code_ttl_minutes(&self) -> u64 {
        (self.code_ttl_seconds + 59) / 60
    }
}
