//! # LeadCall Core
//!
//! Phone verification engine for the LeadCall lead-capture backend.
//! This crate holds the domain entities, the throttling and cost-control
//! services, the verification workflow, storage interfaces and error types.
//! Concrete stores and SMS providers live in `lc_infra`.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
