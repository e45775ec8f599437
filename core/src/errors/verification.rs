//! Verification error taxonomy
//!
//! Every failure a caller of the verification engine can see. Display strings
//! are bilingual (`English | 한국어`) and safe to show to the end user; they
//! never carry provider or storage internals.

use lc_shared::errors::error_codes;
use lc_shared::ErrorResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a send request was refused before any code was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleReason {
    /// A code was sent to this phone within the duplicate window
    DuplicateSend,
    /// The global daily send limit has been reached
    DailyLimitReached,
    /// The monthly budget has been used up
    MonthlyBudgetExceeded,
    /// The per-phone hourly or daily limit has been reached
    RateLimited,
    /// The phone is temporarily blocked
    TemporarilyBlocked,
    /// The previous code is younger than the minimum resend interval
    ResendInterval,
}

impl ThrottleReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThrottleReason::DuplicateSend => "duplicate_send",
            ThrottleReason::DailyLimitReached => "daily_limit_reached",
            ThrottleReason::MonthlyBudgetExceeded => "monthly_budget_exceeded",
            ThrottleReason::RateLimited => "rate_limited",
            ThrottleReason::TemporarilyBlocked => "temporarily_blocked",
            ThrottleReason::ResendInterval => "resend_interval",
        }
    }
}

impl std::fmt::Display for ThrottleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by verification operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerificationError {
    #[error("Invalid phone number. Please enter a mobile number such as 010-1234-5678 | 올바른 휴대폰 번호를 입력해주세요 (예: 010-1234-5678)")]
    InvalidPhoneFormat,

    #[error("The verification code must be {length} digits | 인증번호는 {length}자리 숫자입니다")]
    InvalidCodeFormat { length: usize },

    #[error("{}", throttle_message(.reason, .retry_after_seconds))]
    Throttled {
        reason: ThrottleReason,
        retry_after_seconds: Option<u64>,
    },

    #[error("No verification code has been requested for this number | 인증번호를 먼저 요청해주세요")]
    CodeNotFound,

    #[error("The verification code has expired. Please request a new one | 인증번호가 만료되었습니다. 다시 요청해주세요")]
    CodeExpired,

    #[error("Too many incorrect attempts. Please request a new code | 입력 횟수를 초과했습니다. 인증번호를 다시 요청해주세요")]
    AttemptsExhausted,

    #[error("The verification code is incorrect. {remaining} attempts left | 인증번호가 일치하지 않습니다. 남은 시도: {remaining}회")]
    CodeMismatch { remaining: u32 },

    #[error("We could not send the verification SMS. Please try again shortly | 인증번호 발송에 실패했습니다. 잠시 후 다시 시도해주세요")]
    SmsDeliveryFailed { attempts: u32 },

    #[error("The service is temporarily unavailable. Please try again shortly | 일시적인 오류가 발생했습니다. 잠시 후 다시 시도해주세요")]
    StorageUnavailable,

    #[error("This phone number has already been registered | 이미 등록된 전화번호입니다")]
    AlreadyRegistered,
}

fn throttle_message(reason: &ThrottleReason, retry_after: &Option<u64>) -> String {
    let base = match reason {
        ThrottleReason::DuplicateSend | ThrottleReason::ResendInterval => {
            "A code was sent recently. Please check your messages | 인증번호가 이미 발송되었습니다. 문자를 확인해주세요"
        }
        ThrottleReason::DailyLimitReached => {
            "Verification is unavailable for today. Please try again tomorrow | 오늘은 더 이상 인증번호를 보낼 수 없습니다. 내일 다시 시도해주세요"
        }
        ThrottleReason::MonthlyBudgetExceeded => {
            "Verification is temporarily unavailable | 인증 서비스를 일시적으로 이용할 수 없습니다"
        }
        ThrottleReason::RateLimited => {
            "Too many requests for this number | 요청 횟수를 초과했습니다"
        }
        ThrottleReason::TemporarilyBlocked => {
            "This number is temporarily blocked | 일시적으로 차단된 번호입니다"
        }
    };

    match retry_after {
        Some(seconds) if *seconds > 0 => {
            let (en, ko) = base.split_once(" | ").unwrap_or((base, base));
            format!(
                "{} (retry in {}s) | {} ({}초 후 재시도)",
                en, seconds, ko, seconds
            )
        }
        _ => base.to_string(),
    }
}

impl VerificationError {
    /// Convenience constructor for refusals
    pub fn throttled(reason: ThrottleReason, retry_after_seconds: Option<u64>) -> Self {
        VerificationError::Throttled {
            reason,
            retry_after_seconds,
        }
    }

    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            VerificationError::InvalidPhoneFormat => error_codes::PHONE_INVALID,
            VerificationError::InvalidCodeFormat { .. } => error_codes::CODE_FORMAT_INVALID,
            VerificationError::Throttled { .. } => error_codes::THROTTLED,
            VerificationError::CodeNotFound => error_codes::CODE_NOT_FOUND,
            VerificationError::CodeExpired => error_codes::CODE_EXPIRED,
            VerificationError::AttemptsExhausted => error_codes::ATTEMPTS_EXHAUSTED,
            VerificationError::CodeMismatch { .. } => error_codes::CODE_MISMATCH,
            VerificationError::SmsDeliveryFailed { .. } => error_codes::SMS_ERROR,
            VerificationError::StorageUnavailable => error_codes::STORAGE_ERROR,
            VerificationError::AlreadyRegistered => error_codes::ALREADY_REGISTERED,
        }
    }

    /// Seconds the caller should wait before retrying, when known
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            VerificationError::Throttled {
                retry_after_seconds,
                ..
            } => *retry_after_seconds,
            _ => None,
        }
    }

    /// Attempts left on the current code, for mismatches
    pub fn remaining_attempts(&self) -> Option<u32> {
        match self {
            VerificationError::CodeMismatch { remaining } => Some(*remaining),
            VerificationError::AttemptsExhausted => Some(0),
            _ => None,
        }
    }

    /// English half of the message
    pub fn english_message(&self) -> String {
        let message = self.to_string();
        match message.split_once(" | ") {
            Some((en, _)) => en.to_string(),
            None => message,
        }
    }

    /// Korean half of the message
    pub fn korean_message(&self) -> String {
        let message = self.to_string();
        match message.split_once(" | ") {
            Some((_, ko)) => ko.to_string(),
            None => message,
        }
    }
}

impl From<&VerificationError> for ErrorResponse {
    fn from(err: &VerificationError) -> Self {
        let mut response = ErrorResponse::new(err.error_code(), err.to_string())
            .with_retry_after(err.retry_after_seconds());

        if let VerificationError::Throttled { reason, .. } = err {
            response = response.add_detail("reason", reason.as_str());
        }
        if let Some(remaining) = err.remaining_attempts() {
            response = response.add_detail("remaining_attempts", remaining);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_carries_remaining() {
        let err = VerificationError::CodeMismatch { remaining: 4 };
        assert!(err.to_string().contains("4 attempts left"));
        assert!(err.korean_message().contains("남은 시도: 4회"));
        assert_eq!(err.remaining_attempts(), Some(4));
        assert_eq!(err.error_code(), error_codes::CODE_MISMATCH);
    }

    #[test]
    fn test_throttled_message_includes_wait() {
        let err = VerificationError::throttled(ThrottleReason::DuplicateSend, Some(240));
        assert!(err.english_message().contains("retry in 240s"));
        assert!(err.korean_message().contains("240초"));
        assert_eq!(err.retry_after_seconds(), Some(240));
    }

    #[test]
    fn test_throttled_message_without_wait() {
        let err = VerificationError::throttled(ThrottleReason::MonthlyBudgetExceeded, None);
        assert!(!err.to_string().contains("retry in"));
        assert_eq!(err.error_code(), error_codes::THROTTLED);
    }

    #[test]
    fn test_messages_hide_internals() {
        let err = VerificationError::SmsDeliveryFailed { attempts: 3 };
        assert!(!err.to_string().contains("attempt"));
        assert!(err.to_string().contains(" | "));
    }

    #[test]
    fn test_error_response_conversion() {
        let err = VerificationError::throttled(ThrottleReason::RateLimited, Some(60));
        let response = ErrorResponse::from(&err);

        assert_eq!(response.error, error_codes::THROTTLED);
        assert_eq!(response.retry_after, Some(60));
        let details = response.details.expect("details");
        assert_eq!(details["reason"], serde_json::json!("rate_limited"));
    }
}
