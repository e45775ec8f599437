//! Alert delivery seam for cost thresholds

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Threshold that triggered an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Daily send count passed the warning ratio
    DailyWarning,
    /// Daily send count reached the limit
    DailyLimitReached,
    /// Month-to-date spend passed the warning ratio of the budget
    MonthlyBudgetWarning,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::DailyWarning => "daily_warning",
            AlertKind::DailyLimitReached => "daily_limit_reached",
            AlertKind::MonthlyBudgetWarning => "monthly_budget_warning",
        }
    }

    /// Monthly alerts fire at most once per calendar month, the rest once per day
    pub fn is_monthly(&self) -> bool {
        matches!(self, AlertKind::MonthlyBudgetWarning)
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for operator alerts
///
/// Delivery is fire-and-forget: implementations log their own failures and
/// never hold up the send path.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn notify(&self, kind: AlertKind, message: &str);
}
