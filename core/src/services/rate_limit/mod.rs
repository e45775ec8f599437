//! Per-phone rate limiting
//!
//! Hourly and daily caps per phone number, temporary blocks for phones that
//! keep hammering the endpoint, and a sweep that forgets idle phones.

mod limiter;
mod types;


pub use limiter::RateLimiter;
pub use types::{RateLimitDecision, RateLimitReason};
