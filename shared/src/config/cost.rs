//! SMS cost control and alerting configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{env_opt, env_or};

/// Cost control configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CostConfig {
    /// Minimum seconds between two accepted sends to the same phone
    #[serde(default = "default_duplicate_window")]
    pub duplicate_window_seconds: u64,

    /// Maximum sends per calendar day, across all phones
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u64,

    /// Monthly spend ceiling in currency units (KRW)
    #[serde(default = "default_monthly_budget")]
    pub monthly_budget: f64,

    /// Fraction of the daily limit that triggers a warning alert
    #[serde(default = "default_daily_warning_ratio")]
    pub daily_warning_ratio: f64,

    /// Fraction of the monthly budget that triggers a warning alert
    #[serde(default = "default_monthly_warning_ratio")]
    pub monthly_warning_ratio: f64,

    /// Offset from UTC, in minutes, of the timezone used for calendar days
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,

    /// Unit cost per send, keyed by lowercase provider name
    #[serde(default = "default_provider_costs")]
    pub provider_costs: HashMap<String, f64>,

    /// Unit cost for providers missing from `provider_costs`
    #[serde(default = "default_unit_cost")]
    pub default_unit_cost: f64,

    /// How often stale duplicate-window entries are purged, in seconds
    #[serde(default = "default_purge_interval")]
    pub purge_interval_seconds: u64,

    /// How often the day rollover check runs, in seconds
    #[serde(default = "default_rollover_check_interval")]
    pub rollover_check_interval_seconds: u64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            duplicate_window_seconds: default_duplicate_window(),
            daily_limit: default_daily_limit(),
            monthly_budget: default_monthly_budget(),
            daily_warning_ratio: default_daily_warning_ratio(),
            monthly_warning_ratio: default_monthly_warning_ratio(),
            utc_offset_minutes: default_utc_offset_minutes(),
            provider_costs: default_provider_costs(),
            default_unit_cost: default_unit_cost(),
            purge_interval_seconds: default_purge_interval(),
            rollover_check_interval_seconds: default_rollover_check_interval(),
        }
    }
}

impl CostConfig {
    /// Apply `COST_*` overrides on top of `base`
    pub fn from_env_or(base: Self) -> Self {
        Self {
            duplicate_window_seconds: env_or(
                "COST_DUPLICATE_WINDOW_SECONDS",
                base.duplicate_window_seconds,
            ),
            daily_limit: env_or("COST_DAILY_LIMIT", base.daily_limit),
            monthly_budget: env_or("COST_MONTHLY_BUDGET", base.monthly_budget),
            utc_offset_minutes: env_or("COST_UTC_OFFSET_MINUTES", base.utc_offset_minutes),
            ..base
        }
    }

    /// Unit cost of one send through `provider`
    pub fn unit_cost(&self, provider: &str) -> f64 {
        self.provider_costs
            .get(&provider.to_lowercase())
            .copied()
            .unwrap_or(self.default_unit_cost)
    }

    /// Highest unit cost any configured provider can charge
    pub fn max_unit_cost(&self) -> f64 {
        self.provider_costs
            .values()
            .copied()
            .fold(self.default_unit_cost, f64::max)
    }
}

/// Alert delivery configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AlertConfig {
    /// Incoming-webhook URL (Slack compatible); alerts are only logged when absent
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl AlertConfig {
    /// Load from `ALERT_WEBHOOK_URL`
    pub fn from_env() -> Self {
        Self {
            webhook_url: env_opt("ALERT_WEBHOOK_URL"),
        }
    }
}

fn default_duplicate_window() -> u64 {
    300 // 5 minutes
}

fn default_daily_limit() -> u64 {
    100
}

fn default_monthly_budget() -> f64 {
    100_000.0
}

fn default_daily_warning_ratio() -> f64 {
    0.8
}

fn default_monthly_warning_ratio() -> f64 {
    0.8
}

fn default_utc_offset_minutes() -> i32 {
    9 * 60 // KST
}

fn default_provider_costs() -> HashMap<String, f64> {
    HashMap::from([
        ("nhn".to_string(), 13.0),
        ("aligo".to_string(), 9.0),
        ("twilio".to_string(), 110.0),
        ("mock".to_string(), 0.0),
    ])
}

fn default_unit_cost() -> f64 {
    20.0
}

fn default_purge_interval() -> u64 {
    3600
}

fn default_rollover_check_interval() -> u64 {
    60
}
