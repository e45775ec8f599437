//! Per-phone request history used by the rate limiter.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Send history for one phone number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitEntry {
    /// Normalized phone number
    pub phone: String,

    /// Attempts inside the current hourly window
    pub attempts: u32,

    /// Start of the current hourly window
    pub first_attempt: DateTime<Utc>,

    /// Most recent recorded attempt
    pub last_attempt: DateTime<Utc>,

    /// Set while the phone is temporarily blocked
    pub blocked_until: Option<DateTime<Utc>>,

    /// Attempts inside the current 24-hour window
    pub day_attempts: u32,

    /// Start of the current 24-hour window
    pub day_started: DateTime<Utc>,
}

impl RateLimitEntry {
    /// Entry for a phone's first recorded attempt
    pub fn first(phone: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            phone: phone.into(),
            attempts: 1,
            first_attempt: now,
            last_attempt: now,
            blocked_until: None,
            day_attempts: 1,
            day_started: now,
        }
    }

    /// Count one more attempt, restarting any window that has run out
    pub fn record(&mut self, now: DateTime<Utc>) {
        if now - self.first_attempt >= Duration::hours(1) {
            self.attempts = 1;
            self.first_attempt = now;
        } else {
            self.attempts += 1;
        }

        if now - self.day_started >= Duration::hours(24) {
            self.day_attempts = 1;
            self.day_started = now;
        } else {
            self.day_attempts += 1;
        }

        self.last_attempt = now;
    }

    /// Whether a block is in force at `now`
    pub fn is_blocked(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until.map_or(false, |until| until > now)
    }

    /// Whether the hourly window that started at `first_attempt` is still open
    pub fn hour_window_open(&self, now: DateTime<Utc>) -> bool {
        now - self.first_attempt < Duration::hours(1)
    }

    /// Whether the 24-hour window that started at `day_started` is still open
    pub fn day_window_open(&self, now: DateTime<Utc>) -> bool {
        now - self.day_started < Duration::hours(24)
    }

    /// Clear counters and any block
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.attempts = 0;
        self.day_attempts = 0;
        self.first_attempt = now;
        self.day_started = now;
        self.blocked_until = None;
    }
}
