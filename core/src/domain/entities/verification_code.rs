//! Verification code entity for SMS phone verification.

use chrono::{DateTime, Duration, Utc};
use lc_shared::config::CODE_LENGTH_RANGE;
use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};

/// Seconds an expired record is kept before stores may drop it, so a late
/// submission reads as expired instead of missing
pub const EXPIRED_RETENTION_SECONDS: i64 = 60;

/// An outstanding verification code for one phone number
///
/// At most one record exists per phone; issuing a new code replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Normalized phone number (digits only)
    pub phone: String,

    /// The numeric code that was sent
    pub code: String,

    /// When the code was issued
    pub created_at: DateTime<Utc>,

    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,

    /// Failed submissions so far
    pub attempts: u32,
}

impl VerificationCode {
    /// Create a record for a freshly generated code
    ///
    /// # Arguments
    ///
    /// * `phone` - Normalized phone number
    /// * `code` - The generated code
    /// * `now` - Issue time
    /// * `ttl` - How long the code stays valid
    pub fn issue(phone: impl Into<String>, code: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            phone: phone.into(),
            code: code.into(),
            created_at: now,
            expires_at: now + ttl,
            attempts: 0,
        }
    }

    /// Generate a uniformly distributed numeric code of exactly `length` digits
    /// using the operating system CSPRNG. The first digit is never zero.
    ///
    /// `length` must lie in [`CODE_LENGTH_RANGE`]; configuration is validated
    /// against it at startup.
    pub fn generate_code(length: usize) -> String {
        debug_assert!(CODE_LENGTH_RANGE.contains(&length), "code length {} out of range", length);
        let length = length.clamp(*CODE_LENGTH_RANGE.start(), *CODE_LENGTH_RANGE.end()) as u32;
        let low = 10u64.pow(length - 1);
        let high = 10u64.pow(length);
        OsRng.gen_range(low..high).to_string()
    }

    /// Whether the code is past its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the record has outlived [`EXPIRED_RETENTION_SECONDS`] at `now`
    pub fn is_purgeable_at(&self, now: DateTime<Utc>) -> bool {
        now - self.expires_at > Duration::seconds(EXPIRED_RETENTION_SECONDS)
    }

    /// Submissions left before the code is exhausted
    pub fn remaining_attempts(&self, max_attempts: u32) -> u32 {
        max_attempts.saturating_sub(self.attempts)
    }

    /// Seconds until this code's TTL runs out, never negative
    pub fn ttl_seconds(&self, now: DateTime<Utc>) -> u64 {
        (self.expires_at - now).num_seconds().max(0) as u64
    }

    /// Time left before another code may be issued for the same phone,
    /// or `None` if the resend interval has already passed
    pub fn resend_wait(&self, now: DateTime<Utc>, min_interval: Duration) -> Option<Duration> {
        let elapsed = now - self.created_at;
        if elapsed < min_interval {
            Some(min_interval - elapsed)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/verification_code_tests.rs"]
mod tests;
