//! SMS cost control
//!
//! Suppresses duplicate sends to one phone, caps the global daily send
//! count, enforces the monthly budget and raises threshold alerts.

mod guard;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use guard::CostGuard;
pub use traits::{AlertKind, AlertSink};
pub use types::{CostDecision, CostDenyReason, CostPrediction, CostReservation};
