//! Per-phone request rate limiter

use chrono::Duration;
use lc_shared::phone::{mask_phone_number, normalize_phone_number};
use lc_shared::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::domain::entities::RateLimitEntry;

use super::types::{RateLimitDecision, RateLimitReason};

/// Caps how many codes one phone may request per hour and per day
///
/// State is kept in memory and keyed by the normalized phone number, so
/// `010-1234-5678` and `01012345678` share one entry.
pub struct RateLimiter {
    entries: RwLock<HashMap<String, RateLimitEntry>>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            clock,
        }
    }

    /// Decide whether `phone` may request another code right now
    ///
    /// Blocks are checked first, then the hourly cap, then the 24-hour cap.
    /// Windows that have run out never deny.
    pub async fn is_allowed(&self, phone: &str) -> RateLimitDecision {
        if !self.config.enabled {
            return RateLimitDecision::allow();
        }

        let key = normalize_phone_number(phone);
        let now = self.clock.now();
        let entries = self.entries.read().await;

        let Some(entry) = entries.get(&key) else {
            return RateLimitDecision::allow();
        };

        if let Some(until) = entry.blocked_until.filter(|until| *until > now) {
            tracing::warn!(
                phone = %mask_phone_number(&key),
                blocked_until = %until,
                event = "rate_limit_blocked",
                "Request from temporarily blocked phone"
            );
            return RateLimitDecision::deny(RateLimitReason::TemporarilyBlocked, until);
        }

        if entry.hour_window_open(now) && entry.attempts >= self.config.max_per_hour {
            tracing::warn!(
                phone = %mask_phone_number(&key),
                attempts = entry.attempts,
                limit = self.config.max_per_hour,
                event = "rate_limit_hourly",
                "Hourly request limit reached"
            );
            return RateLimitDecision::deny(
                RateLimitReason::HourlyLimit,
                entry.first_attempt + Duration::hours(1),
            );
        }

        if entry.day_window_open(now) && entry.day_attempts >= self.config.max_per_day {
            tracing::warn!(
                phone = %mask_phone_number(&key),
                attempts = entry.day_attempts,
                limit = self.config.max_per_day,
                event = "rate_limit_daily",
                "Daily request limit reached"
            );
            return RateLimitDecision::deny(
                RateLimitReason::DailyLimit,
                entry.day_started + Duration::hours(24),
            );
        }

        RateLimitDecision::allow()
    }

    /// Count one attempt for `phone`
    ///
    /// Once the hourly count passes twice the hourly cap the phone is blocked
    /// for the configured block duration.
    pub async fn record_attempt(&self, phone: &str) {
        let key = normalize_phone_number(phone);
        let now = self.clock.now();
        let mut entries = self.entries.write().await;

        let entry = entries
            .entry(key.clone())
            .and_modify(|e| e.record(now))
            .or_insert_with(|| RateLimitEntry::first(key.clone(), now));

        if entry.attempts > self.config.block_threshold() && !entry.is_blocked(now) {
            let until = now + Duration::seconds(self.config.block_duration_seconds as i64);
            entry.blocked_until = Some(until);
            tracing::warn!(
                phone = %mask_phone_number(&key),
                attempts = entry.attempts,
                blocked_until = %until,
                event = "rate_limit_block_applied",
                "Phone temporarily blocked after excessive requests"
            );
        }
    }

    /// Forget `phone` entirely after a successful verification
    pub async fn record_success(&self, phone: &str) {
        let key = normalize_phone_number(phone);
        self.entries.write().await.remove(&key);
    }

    /// Clear counters and any block for `phone`
    ///
    /// # Returns
    /// `true` if the phone had an entry
    pub async fn unblock(&self, phone: &str) -> bool {
        let key = normalize_phone_number(phone);
        let now = self.clock.now();
        let found = match self.entries.write().await.get_mut(&key) {
            Some(entry) => {
                entry.reset(now);
                true
            }
            None => false,
        };

        tracing::info!(
            phone = %mask_phone_number(&key),
            found = found,
            event = "rate_limit_unblocked",
            "Rate limit entry cleared by operator"
        );
        found
    }

    /// Drop entries idle for longer than the inactivity TTL
    ///
    /// Entries under an active block are kept.
    ///
    /// # Returns
    /// Number of entries removed
    pub async fn sweep(&self) -> usize {
        let now = self.clock.now();
        let ttl = Duration::seconds(self.config.inactivity_ttl_seconds as i64);
        let mut entries = self.entries.write().await;
        let before = entries.len();

        entries.retain(|_, entry| entry.is_blocked(now) || now - entry.last_attempt <= ttl);

        before - entries.len()
    }

    /// Snapshot of the entry for `phone`
    pub async fn entry(&self, phone: &str) -> Option<RateLimitEntry> {
        let key = normalize_phone_number(phone);
        self.entries.read().await.get(&key).cloned()
    }

    /// Number of tracked phones
    pub async fn tracked_count(&self) -> usize {
        self.entries.read().await.len()
    }
}
