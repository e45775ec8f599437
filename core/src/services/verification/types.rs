//! Types for verification results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::VerificationError;

/// Result of sending a verification code
#[derive(Debug, Clone)]
pub struct SendCodeResult {
    /// Normalized phone number the code went to
    pub phone: String,
    /// The SMS message ID from the provider
    pub message_id: String,
    /// Provider attempts the dispatch took
    pub dispatch_attempts: u32,
    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,
    /// Seconds until expiry at issue time
    pub expires_in_seconds: u64,
    /// When the user can request another code
    pub next_resend_at: DateTime<Utc>,
    /// The plaintext code, only outside production
    pub demo_code: Option<String>,
}

/// Result of a successful verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyCodeResult {
    /// Normalized phone number that was verified
    pub phone: String,
    pub verified: bool,
}

/// Caller-facing outcome of either operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,

    /// Human-readable, actionable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Seconds to wait before retrying
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,

    /// Seconds until the issued code expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// Plaintext code, only outside production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_code: Option<String>,
}

impl VerificationResponse {
    fn empty(success: bool) -> Self {
        Self {
            success,
            verified: None,
            message: None,
            error: None,
            retry_after: None,
            remaining_attempts: None,
            expires_in: None,
            demo_code: None,
        }
    }
}

impl From<&SendCodeResult> for VerificationResponse {
    fn from(result: &SendCodeResult) -> Self {
        Self {
            message: Some("Verification code sent | 인증번호가 발송되었습니다".to_string()),
            expires_in: Some(result.expires_in_seconds),
            demo_code: result.demo_code.clone(),
            ..Self::empty(true)
        }
    }
}

impl From<&VerifyCodeResult> for VerificationResponse {
    fn from(result: &VerifyCodeResult) -> Self {
        Self {
            verified: Some(result.verified),
            message: Some("Phone number verified | 휴대폰 인증이 완료되었습니다".to_string()),
            ..Self::empty(true)
        }
    }
}

impl From<&VerificationError> for VerificationResponse {
    fn from(err: &VerificationError) -> Self {
        Self {
            verified: match err {
                VerificationError::CodeMismatch { .. }
                | VerificationError::CodeExpired
                | VerificationError::AttemptsExhausted
                | VerificationError::CodeNotFound => Some(false),
                _ => None,
            },
            message: Some(err.to_string()),
            error: Some(err.error_code().to_string()),
            retry_after: err.retry_after_seconds(),
            remaining_attempts: err.remaining_attempts(),
            ..Self::empty(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ThrottleReason;

    #[test]
    fn test_throttled_response_carries_retry_after() {
        let err = VerificationError::throttled(ThrottleReason::DuplicateSend, Some(120));
        let response = VerificationResponse::from(&err);

        assert!(!response.success);
        assert_eq!(response.retry_after, Some(120));
        assert_eq!(response.error.as_deref(), Some("THROTTLED"));
        assert!(response.demo_code.is_none());
    }

    #[test]
    fn test_mismatch_response_json() {
        let err = VerificationError::CodeMismatch { remaining: 4 };
        let json = serde_json::to_value(VerificationResponse::from(&err)).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["verified"], false);
        assert_eq!(json["remaining_attempts"], 4);
        assert!(json.get("demo_code").is_none());
        assert!(json["message"].as_str().unwrap().contains("남은 시도: 4회"));
    }

    #[test]
    fn test_verified_response() {
        let result = VerifyCodeResult {
            phone: "01012345678".into(),
            verified: true,
        };
        let response = VerificationResponse::from(&result);
        assert!(response.success);
        assert_eq!(response.verified, Some(true));
    }
}
