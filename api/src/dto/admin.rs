use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use lc_core::DailyStats;

/// Body of `POST /api/v1/admin/rate-limit/unblock`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UnblockRequest {
    #[validate(length(min = 10, max = 20, message = "phone must be 10-20 characters"))]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnblockResponse {
    /// Whether the phone had any rate-limit state to clear
    pub cleared: bool,
}

/// Today's send counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStatsResponse {
    pub date: NaiveDate,
    pub count: u64,
    pub successes: u64,
    pub failures: u64,
    pub cost: f64,
    pub daily_limit: u64,
}

impl DailyStatsResponse {
    pub fn new(stats: &DailyStats, daily_limit: u64) -> Self {
        Self {
            date: stats.date,
            count: stats.count,
            successes: stats.successes(),
            failures: stats.failures,
            cost: stats.cost,
            daily_limit,
        }
    }
}
