//! Cost guard decision and report types

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::errors::ThrottleReason;

/// Why the cost guard refused a send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostDenyReason {
    DuplicateSend,
    DailyLimitReached,
    MonthlyBudgetExceeded,
}

impl From<CostDenyReason> for ThrottleReason {
    fn from(reason: CostDenyReason) -> Self {
        match reason {
            CostDenyReason::DuplicateSend => ThrottleReason::DuplicateSend,
            CostDenyReason::DailyLimitReached => ThrottleReason::DailyLimitReached,
            CostDenyReason::MonthlyBudgetExceeded => ThrottleReason::MonthlyBudgetExceeded,
        }
    }
}

/// Outcome of [`CostGuard::can_send`](super::CostGuard::can_send)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostDecision {
    pub allowed: bool,
    pub reason: Option<CostDenyReason>,
    /// Seconds until the refusal lifts
    pub wait_time_seconds: Option<u64>,
}

impl CostDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            wait_time_seconds: None,
        }
    }

    pub fn deny(reason: CostDenyReason, wait_time_seconds: u64) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            wait_time_seconds: Some(wait_time_seconds),
        }
    }
}

/// Send slot held against the daily limit and monthly budget
///
/// Obtained from [`CostGuard::reserve`](super::CostGuard::reserve) and handed
/// back through [`CostGuard::settle`](super::CostGuard::settle) once the
/// dispatch outcome is known. Dropping it unsettled frees the slot without
/// charging anything.
#[derive(Debug)]
#[must_use = "dropping a reservation releases its slot"]
pub struct CostReservation {
    phone: String,
    in_flight: Arc<AtomicU64>,
    held: bool,
}

impl CostReservation {
    pub(super) fn hold(phone: String, in_flight: Arc<AtomicU64>) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self {
            phone,
            in_flight,
            held: true,
        }
    }

    /// Normalized phone the slot was reserved for
    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub(super) fn release(&mut self) {
        if std::mem::take(&mut self.held) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for CostReservation {
    fn drop(&mut self) {
        self.release();
    }
}

/// End-of-month spend projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostPrediction {
    /// Month-to-date spend
    pub current_cost: f64,
    /// Linear projection to the end of the month
    pub projected_cost: f64,
    pub monthly_budget: f64,
    pub days_elapsed: u32,
    pub days_in_month: u32,
    /// Set when persisted history was unavailable and `current_cost` is extrapolated
    pub approximate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}
