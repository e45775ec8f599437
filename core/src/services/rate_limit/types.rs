//! Rate limiter decision types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ThrottleReason;

/// Why the rate limiter refused a phone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitReason {
    /// A block is in force
    TemporarilyBlocked,
    /// Hourly cap reached
    HourlyLimit,
    /// 24-hour cap reached
    DailyLimit,
}

impl From<RateLimitReason> for ThrottleReason {
    fn from(reason: RateLimitReason) -> Self {
        match reason {
            RateLimitReason::TemporarilyBlocked => ThrottleReason::TemporarilyBlocked,
            RateLimitReason::HourlyLimit | RateLimitReason::DailyLimit => ThrottleReason::RateLimited,
        }
    }
}

/// Outcome of [`RateLimiter::is_allowed`](super::RateLimiter::is_allowed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub reason: Option<RateLimitReason>,
    /// Earliest time the phone may try again
    pub retry_after: Option<DateTime<Utc>>,
}

impl RateLimitDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            retry_after: None,
        }
    }

    pub fn deny(reason: RateLimitReason, retry_after: DateTime<Utc>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            retry_after: Some(retry_after),
        }
    }

    /// Seconds from `now` until `retry_after`, rounded up
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> Option<u64> {
        self.retry_after.map(|at| {
            let millis = (at - now).num_milliseconds().max(0) as u64;
            (millis + 999) / 1000
        })
    }
}
