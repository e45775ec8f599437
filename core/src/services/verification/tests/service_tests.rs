//! Unit tests for the verification engine

use chrono::Duration;
use lc_shared::{CostConfig, RateLimitConfig};

use super::mocks::{test_engine, MockLeadStore, MockSmsSender, TestEngineBuilder};
use crate::errors::{ThrottleReason, VerificationError};
use crate::services::dispatch::SmsError;
use crate::services::verification::VerificationServiceConfig;

const PHONE: &str = "01012345678";

/// Builder with the cost duplicate window and resend interval turned off,
/// so tests can issue several codes in a row
fn unthrottled() -> TestEngineBuilder {
    let mut builder = TestEngineBuilder::new();
    builder.cost = CostConfig {
        duplicate_window_seconds: 0,
        ..Default::default()
    };
    builder.config.min_resend_interval_seconds = 0;
    builder
}

#[tokio::test]
async fn test_request_then_verify_flow() {
    let t = test_engine();

    let sent = t.engine.request_code(PHONE).await.unwrap();
    let code = sent.demo_code.clone().expect("demo code exposed");
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(t.sms.last_code(PHONE), Some(code.clone()));
    assert_eq!(sent.expires_in_seconds, 180);

    let err = t.engine.submit_code(PHONE, "000000").await.unwrap_err();
    assert_eq!(err, VerificationError::CodeMismatch { remaining: 4 });
    assert!(err.to_string().contains("남은 시도: 4회"));

    let verified = t.engine.submit_code(PHONE, &code).await.unwrap();
    assert!(verified.verified);

    let err = t.engine.submit_code(PHONE, &code).await.unwrap_err();
    assert_eq!(err, VerificationError::CodeNotFound);
}

#[tokio::test]
async fn test_formatted_phone_is_normalized() {
    let t = test_engine();

    let sent = t.engine.request_code("010-1234-5678").await.unwrap();
    assert_eq!(sent.phone, PHONE);
    assert!(t.codes.stored(PHONE).is_some());

    let code = sent.demo_code.unwrap();
    assert!(t.engine.submit_code("010 1234 5678", &code).await.is_ok());
}

#[tokio::test]
async fn test_demo_code_hidden_when_disabled() {
    let mut builder = TestEngineBuilder::new();
    builder.config = VerificationServiceConfig::default();
    let t = builder.build();

    let sent = t.engine.request_code(PHONE).await.unwrap();
    assert!(sent.demo_code.is_none());
    assert!(t.sms.last_code(PHONE).is_some());
}

#[tokio::test]
async fn test_invalid_phone_rejected() {
    let t = test_engine();

    for phone in ["", "12345", "02-123-4567", "0101234567890"] {
        let err = t.engine.request_code(phone).await.unwrap_err();
        assert_eq!(err, VerificationError::InvalidPhoneFormat);
    }
    assert_eq!(t.sms.sent_count(), 0);
}

#[tokio::test]
async fn test_invalid_code_format_does_not_consume_attempts() {
    let t = test_engine();
    t.engine.request_code(PHONE).await.unwrap();

    for bad in ["12345", "1234567", "12a456", ""] {
        let err = t.engine.submit_code(PHONE, bad).await.unwrap_err();
        assert_eq!(err, VerificationError::InvalidCodeFormat { length: 6 });
    }
    assert_eq!(t.codes.stored(PHONE).unwrap().attempts, 0);
}

#[tokio::test]
async fn test_rapid_requests_are_throttled() {
    let t = test_engine();

    assert!(t.engine.request_code(PHONE).await.is_ok());

    let mut waits = Vec::new();
    for _ in 0..3 {
        match t.engine.request_code(PHONE).await {
            Err(VerificationError::Throttled {
                reason,
                retry_after_seconds,
            }) => {
                assert_eq!(reason, ThrottleReason::DuplicateSend);
                waits.push(retry_after_seconds.unwrap());
            }
            other => panic!("expected throttling, got {:?}", other),
        }
    }
    assert_eq!(waits, vec![300, 300, 300]);
    assert_eq!(t.sms.sent_count(), 1);
}

#[tokio::test]
async fn test_resend_interval_and_single_active_code() {
    let mut builder = TestEngineBuilder::new();
    builder.cost.duplicate_window_seconds = 0;
    let t = builder.build();

    let first = t.engine.request_code(PHONE).await.unwrap().demo_code.unwrap();

    t.clock.advance(Duration::seconds(30));
    let err = t.engine.request_code(PHONE).await.unwrap_err();
    assert_eq!(
        err,
        VerificationError::throttled(ThrottleReason::ResendInterval, Some(30))
    );

    t.clock.advance(Duration::seconds(30));
    let second = t.engine.request_code(PHONE).await.unwrap().demo_code.unwrap();

    if first != second {
        let err = t.engine.submit_code(PHONE, &first).await.unwrap_err();
        assert!(matches!(err, VerificationError::CodeMismatch { .. }));
    }
    assert!(t.engine.submit_code(PHONE, &second).await.is_ok());
}

#[tokio::test]
async fn test_hourly_rate_limit() {
    let t = unthrottled().build();

    for _ in 0..3 {
        t.engine.request_code(PHONE).await.unwrap();
        t.clock.advance(Duration::minutes(1));
    }

    let err = t.engine.request_code(PHONE).await.unwrap_err();
    assert_eq!(
        err,
        VerificationError::throttled(ThrottleReason::RateLimited, Some(57 * 60))
    );

    t.clock.advance(Duration::minutes(58));
    assert!(t.engine.request_code(PHONE).await.is_ok());
}

#[tokio::test]
async fn test_attempt_exhaustion() {
    let t = test_engine();
    let code = t.engine.request_code(PHONE).await.unwrap().demo_code.unwrap();

    for expected_remaining in (0..5).rev() {
        let err = t.engine.submit_code(PHONE, "000000").await.unwrap_err();
        assert_eq!(
            err,
            VerificationError::CodeMismatch {
                remaining: expected_remaining
            }
        );
    }

    let err = t.engine.submit_code(PHONE, &code).await.unwrap_err();
    assert_eq!(err, VerificationError::AttemptsExhausted);
    assert!(t.codes.stored(PHONE).is_none());

    let err = t.engine.submit_code(PHONE, &code).await.unwrap_err();
    assert_eq!(err, VerificationError::CodeNotFound);
}

#[tokio::test]
async fn test_expired_code_rejected_and_deleted() {
    let t = test_engine();
    let code = t.engine.request_code(PHONE).await.unwrap().demo_code.unwrap();

    t.clock.advance(Duration::seconds(181));
    let err = t.engine.submit_code(PHONE, &code).await.unwrap_err();
    assert_eq!(err, VerificationError::CodeExpired);
    assert!(t.codes.stored(PHONE).is_none());
}

#[tokio::test]
async fn test_late_submission_after_cleanup_reads_expired() {
    let t = test_engine();
    let code = t.engine.request_code(PHONE).await.unwrap().demo_code.unwrap();

    t.clock.advance(Duration::seconds(181));
    assert_eq!(t.engine.purge_expired_codes().await.unwrap(), 0);

    let err = t.engine.submit_code(PHONE, &code).await.unwrap_err();
    assert_eq!(err, VerificationError::CodeExpired);
}

#[tokio::test]
async fn test_code_valid_until_expiry() {
    let t = test_engine();
    let code = t.engine.request_code(PHONE).await.unwrap().demo_code.unwrap();

    t.clock.advance(Duration::seconds(180));
    assert!(t.engine.submit_code(PHONE, &code).await.is_ok());
}

#[tokio::test]
async fn test_existing_lead_rejected() {
    let mut builder = TestEngineBuilder::new();
    builder.leads = MockLeadStore::with(&[PHONE]);
    let t = builder.build();

    let err = t.engine.request_code("010-1234-5678").await.unwrap_err();
    assert_eq!(err, VerificationError::AlreadyRegistered);
    assert_eq!(t.sms.sent_count(), 0);
    assert!(t.codes.stored(PHONE).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_failure_rolls_back() {
    let mut builder = TestEngineBuilder::new();
    builder.sms = MockSmsSender::always_failing(SmsError::Transport("connection reset".into()));
    let t = builder.build();

    let err = t.engine.request_code(PHONE).await.unwrap_err();
    assert_eq!(err, VerificationError::SmsDeliveryFailed { attempts: 3 });
    assert!(!err.to_string().contains("connection reset"));

    // Code removed, quota untouched, spend still counted
    assert!(t.codes.stored(PHONE).is_none());
    assert!(t.engine.rate_limiter().entry(PHONE).await.is_none());
    let stats = t.engine.cost_guard().daily_stats().await;
    assert_eq!(stats.count, 1);
    assert_eq!(stats.failures, 1);

    // A failed send does not open the duplicate window
    t.sms.set_fail_all(None);
    assert!(t.engine.request_code(PHONE).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_recovers() {
    let mut builder = TestEngineBuilder::new();
    builder.sms = MockSmsSender::scripted(vec![SmsError::Provider("503".into())]);
    let t = builder.build();

    let sent = t.engine.request_code(PHONE).await.unwrap();
    assert_eq!(sent.dispatch_attempts, 2);
    assert_eq!(t.engine.rate_limiter().entry(PHONE).await.unwrap().attempts, 1);
}

#[tokio::test]
async fn test_storage_failure_is_generic() {
    let t = test_engine();
    t.codes.set_failing(true);

    let err = t.engine.request_code(PHONE).await.unwrap_err();
    assert_eq!(err, VerificationError::StorageUnavailable);
    assert!(!err.to_string().contains("offline"));
    assert_eq!(t.sms.sent_count(), 0);

    let err = t.engine.submit_code(PHONE, "123456").await.unwrap_err();
    assert_eq!(err, VerificationError::StorageUnavailable);
}

#[tokio::test]
async fn test_success_clears_rate_limit() {
    let t = unthrottled().build();

    let mut last = String::new();
    for _ in 0..3 {
        last = t.engine.request_code(PHONE).await.unwrap().demo_code.unwrap();
    }
    assert!(t.engine.request_code(PHONE).await.is_err());

    t.engine.submit_code(PHONE, &last).await.unwrap();
    assert!(t.engine.request_code(PHONE).await.is_ok());
}

#[tokio::test]
async fn test_daily_budget_ceiling() {
    let mut builder = TestEngineBuilder::new();
    builder.cost.daily_limit = 2;
    let t = builder.build();

    t.engine.request_code("01011112222").await.unwrap();
    t.engine.request_code("01033334444").await.unwrap();

    let err = t.engine.request_code("01055556666").await.unwrap_err();
    assert!(matches!(
        err,
        VerificationError::Throttled {
            reason: ThrottleReason::DailyLimitReached,
            ..
        }
    ));

    // 12:00 KST plus 12 hours is the next local day
    t.clock.advance(Duration::hours(12));
    t.engine.request_code("01055556666").await.unwrap();
    assert_eq!(t.engine.cost_guard().daily_stats().await.count, 1);
}

#[tokio::test]
async fn test_purge_expired_codes() {
    let t = test_engine();
    t.engine.request_code(PHONE).await.unwrap();
    t.engine.request_code("01099998888").await.unwrap();

    assert_eq!(t.engine.purge_expired_codes().await.unwrap(), 0);
    t.clock.advance(Duration::minutes(5));
    assert_eq!(t.engine.purge_expired_codes().await.unwrap(), 2);
}

#[tokio::test]
async fn test_unblock() {
    let mut builder = unthrottled();
    builder.rate_limit = RateLimitConfig {
        max_per_hour: 1,
        ..Default::default()
    };
    let t = builder.build();

    t.engine.request_code(PHONE).await.unwrap();
    assert!(t.engine.request_code(PHONE).await.is_err());

    assert!(t.engine.unblock("010-1234-5678").await.unwrap());
    assert!(t.engine.request_code(PHONE).await.is_ok());
    assert_eq!(
        t.engine.unblock("123").await.unwrap_err(),
        VerificationError::InvalidPhoneFormat
    );
}
