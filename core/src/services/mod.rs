//! Business services for phone verification and send-cost control.

pub mod cost;
pub mod dispatch;
pub mod maintenance;
pub mod rate_limit;
pub mod verification;

// Re-export commonly used types
pub use cost::{
    AlertKind, AlertSink, CostDecision, CostDenyReason, CostGuard, CostPrediction,
    CostReservation,
};
pub use dispatch::{DispatchError, DispatchReceipt, RetryingDispatcher, SmsError, SmsSender};
pub use maintenance::{MaintenanceConfig, MaintenanceHandle, MaintenanceService};
pub use rate_limit::{RateLimitDecision, RateLimitReason, RateLimiter};
pub use verification::{
    SendCodeResult, VerificationEngine, VerificationResponse, VerificationServiceConfig,
    VerifyCodeResult,
};
