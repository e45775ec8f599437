//! Request and response bodies

pub mod admin;
pub mod verification;

pub use admin::{DailyStatsResponse, UnblockRequest, UnblockResponse};
pub use verification::{RequestCodeRequest, SubmitCodeRequest};
