//! Shared error types and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable error message (bilingual)
    pub message: String,

    /// Seconds the client should wait before retrying, when throttled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,

    /// Additional error details (field errors, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            retry_after: None,
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach a retry hint in seconds
    pub fn with_retry_after(mut self, retry_after: Option<u64>) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Common error codes used across the application
pub mod error_codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const PHONE_INVALID: &str = "PHONE_INVALID";
    pub const CODE_FORMAT_INVALID: &str = "CODE_FORMAT_INVALID";
    pub const THROTTLED: &str = "THROTTLED";
    pub const CODE_NOT_FOUND: &str = "CODE_NOT_FOUND";
    pub const CODE_EXPIRED: &str = "CODE_EXPIRED";
    pub const ATTEMPTS_EXHAUSTED: &str = "ATTEMPTS_EXHAUSTED";
    pub const CODE_MISMATCH: &str = "CODE_MISMATCH";
    pub const SMS_ERROR: &str = "SMS_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const ALREADY_REGISTERED: &str = "ALREADY_REGISTERED";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serialization_skips_empty_fields() {
        let response = ErrorResponse::new(error_codes::THROTTLED, "wait");
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("retry_after").is_none());
        assert!(json.get("details").is_none());

        let response = response.with_retry_after(Some(42)).add_detail("limit", 3);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["retry_after"], 42);
        assert_eq!(json["details"]["limit"], 3);
    }
}
