//! Verification engine for SMS phone verification
//!
//! This module provides the complete verification code workflow:
//! - Code generation, storage and SMS dispatch
//! - Code verification with attempt tracking
//! - Cost and rate-limit checks before every send
//! - Per-phone serialization of concurrent requests

mod config;
mod locks;
mod service;
mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use config::VerificationServiceConfig;
pub use service::VerificationEngine;
pub use types::{SendCodeResult, VerificationResponse, VerifyCodeResult};
