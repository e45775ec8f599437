//! Domain entities for phone verification and send accounting.

pub mod rate_limit_entry;
pub mod send_stats;
pub mod verification_code;

pub use rate_limit_entry::RateLimitEntry;
pub use send_stats::{days_in_month, DailyStats, MonthlyAggregate};
pub use verification_code::{VerificationCode, EXPIRED_RETENTION_SECONDS};
