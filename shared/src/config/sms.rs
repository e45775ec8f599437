//! SMS provider configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{env_opt, env_or};

/// Supported SMS providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    /// Logs messages instead of sending them
    Mock,
    /// NHN Cloud Notification SMS
    Nhn,
    /// Twilio Programmable Messaging
    Twilio,
    /// NHN Cloud primary with Twilio backup
    Failover,
}

impl std::str::FromStr for SmsProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(SmsProvider::Mock),
            "nhn" | "nhncloud" | "toast" => Ok(SmsProvider::Nhn),
            "twilio" => Ok(SmsProvider::Twilio),
            "failover" => Ok(SmsProvider::Failover),
            _ => Err(format!("Invalid SMS provider: {}", s)),
        }
    }
}

/// NHN Cloud credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NhnCloudCredentials {
    /// Application key issued by the NHN Cloud console
    pub app_key: String,
    /// Secret key sent as `X-Secret-Key`
    pub secret_key: String,
    /// Pre-registered sender number
    pub sender_number: String,
    /// API base URL
    #[serde(default = "default_nhn_base_url")]
    pub base_url: String,
}

/// Twilio credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TwilioCredentials {
    /// Account SID
    pub account_sid: String,
    /// Auth token
    pub auth_token: String,
    /// From phone number in E.164 format
    pub from_number: String,
}

/// SMS service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// Selected provider
    pub provider: SmsProvider,

    /// NHN Cloud credentials (required for `nhn` and `failover`)
    #[serde(default)]
    pub nhn: Option<NhnCloudCredentials>,

    /// Twilio credentials (required for `twilio` and `failover`)
    #[serde(default)]
    pub twilio: Option<TwilioCredentials>,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Seconds before a failed primary provider is tried again in failover mode
    #[serde(default = "default_failover_timeout")]
    pub failover_timeout_seconds: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: SmsProvider::Mock,
            nhn: None,
            twilio: None,
            request_timeout_seconds: default_request_timeout(),
            failover_timeout_seconds: default_failover_timeout(),
        }
    }
}

impl SmsConfig {
    /// Apply `SMS_*`, `NHN_SMS_*` and `TWILIO_*` overrides on top of `base`
    pub fn from_env_or(base: Self) -> Self {
        let nhn = match (
            env_opt("NHN_SMS_APP_KEY"),
            env_opt("NHN_SMS_SECRET_KEY"),
            env_opt("NHN_SMS_SENDER_NUMBER"),
        ) {
            (Some(app_key), Some(secret_key), Some(sender_number)) => Some(NhnCloudCredentials {
                app_key,
                secret_key,
                sender_number,
                base_url: env_opt("NHN_SMS_BASE_URL").unwrap_or_else(default_nhn_base_url),
            }),
            _ => base.nhn,
        };

        let twilio = match (
            env_opt("TWILIO_ACCOUNT_SID"),
            env_opt("TWILIO_AUTH_TOKEN"),
            env_opt("TWILIO_FROM_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => base.twilio,
        };

        Self {
            provider: env_or("SMS_PROVIDER", base.provider),
            nhn,
            twilio,
            request_timeout_seconds: env_or(
                "SMS_REQUEST_TIMEOUT_SECONDS",
                base.request_timeout_seconds,
            ),
            failover_timeout_seconds: env_or(
                "SMS_FAILOVER_TIMEOUT_SECONDS",
                base.failover_timeout_seconds,
            ),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn failover_timeout(&self) -> Duration {
        Duration::from_secs(self.failover_timeout_seconds)
    }
}

fn default_nhn_base_url() -> String {
    String::from("https://api-sms.cloud.toast.com")
}

fn default_request_timeout() -> u64 {
    10
}

fn default_failover_timeout() -> u64 {
    30
}
