//! Integration tests for the verification engine through its public API

use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lc_core::{
    AlertKind, AlertSink, CodeStore, CostGuard, DailyStats, DomainResult, LeadStore,
    ManualClock, MonthlyAggregate, RateLimiter, RetryingDispatcher, SmsError, SmsSender,
    StatsSink, ThrottleReason, VerificationCode, VerificationEngine, VerificationError,
    VerificationResponse, VerificationServiceConfig,
};
use lc_shared::{CostConfig, DispatchConfig, RateLimitConfig};

#[derive(Default)]
struct MemoryCodes(Mutex<HashMap<String, VerificationCode>>);

#[async_trait]
impl CodeStore for MemoryCodes {
    async fn put(&self, code: &VerificationCode) -> DomainResult<()> {
        self.0.lock().unwrap().insert(code.phone.clone(), code.clone());
        Ok(())
    }

    async fn get(&self, phone: &str) -> DomainResult<Option<VerificationCode>> {
        Ok(self.0.lock().unwrap().get(phone).cloned())
    }

    async fn increment_attempts(&self, phone: &str) -> DomainResult<Option<u32>> {
        Ok(self.0.lock().unwrap().get_mut(phone).map(|c| {
            c.attempts += 1;
            c.attempts
        }))
    }

    async fn delete(&self, phone: &str) -> DomainResult<()> {
        self.0.lock().unwrap().remove(phone);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let mut codes = self.0.lock().unwrap();
        let before = codes.len();
        codes.retain(|_, c| !c.is_expired_at(now));
        Ok(before - codes.len())
    }
}

struct NoLeads;

#[async_trait]
impl LeadStore for NoLeads {
    async fn exists(&self, _phone: &str) -> DomainResult<bool> {
        Ok(false)
    }
}

#[derive(Default)]
struct MemoryStats(Mutex<HashMap<chrono::NaiveDate, DailyStats>>);

#[async_trait]
impl StatsSink for MemoryStats {
    async fn persist_daily(&self, stats: &DailyStats) -> DomainResult<()> {
        self.0.lock().unwrap().insert(stats.date, stats.clone());
        Ok(())
    }

    async fn load_monthly(&self, year: i32, month: u32) -> DomainResult<MonthlyAggregate> {
        let mut aggregate = MonthlyAggregate::empty(year, month);
        for day in self.0.lock().unwrap().values() {
            if day.date.year() == year && day.date.month() == month {
                aggregate.upsert(day.clone());
            }
        }
        Ok(aggregate)
    }
}

#[derive(Default)]
struct Alerts(Mutex<Vec<AlertKind>>);

#[async_trait]
impl AlertSink for Alerts {
    async fn notify(&self, kind: AlertKind, _message: &str) {
        self.0.lock().unwrap().push(kind);
    }
}

#[derive(Default)]
struct Inbox(Mutex<Vec<(String, String)>>);

#[async_trait]
impl SmsSender for Inbox {
    async fn send(&self, phone: &str, message: &str) -> Result<String, SmsError> {
        let mut sent = self.0.lock().unwrap();
        sent.push((phone.to_string(), message.to_string()));
        Ok(format!("msg-{}", sent.len()))
    }

    fn provider_name(&self) -> &str {
        "inbox"
    }
}

struct Harness {
    engine: VerificationEngine,
    clock: Arc<ManualClock>,
    inbox: Arc<Inbox>,
    stats: Arc<MemoryStats>,
    alerts: Arc<Alerts>,
}

fn harness(cost: CostConfig) -> Harness {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 10, 3, 0, 0).unwrap(),
    ));
    let inbox = Arc::new(Inbox::default());
    let stats = Arc::new(MemoryStats::default());
    let alerts = Arc::new(Alerts::default());

    let engine = VerificationEngine::new(
        Arc::new(MemoryCodes::default()),
        Arc::new(NoLeads),
        Arc::new(RetryingDispatcher::new(inbox.clone(), DispatchConfig::default())),
        Arc::new(RateLimiter::new(RateLimitConfig::default(), clock.clone())),
        Arc::new(CostGuard::new(cost, clock.clone(), stats.clone(), alerts.clone())),
        clock.clone(),
        VerificationServiceConfig::default(),
    );

    Harness {
        engine,
        clock,
        inbox,
        stats,
        alerts,
    }
}

fn code_from_message(message: &str) -> String {
    message
        .split('[')
        .nth(2)
        .and_then(|rest| rest.split(']').next())
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_full_verification_round_trip() {
    let h = harness(CostConfig::default());

    let sent = h.engine.request_code("010-2222-3333").await.unwrap();
    assert_eq!(sent.phone, "01022223333");
    assert!(sent.demo_code.is_none());

    let message = h.inbox.0.lock().unwrap()[0].1.clone();
    assert!(message.starts_with("[LeadCall]"));
    assert!(message.contains("3분"));
    let code = code_from_message(&message);

    let wrong = if code == "999999" { "111111" } else { "999999" };
    let err = h.engine.submit_code("01022223333", wrong).await.unwrap_err();
    let body = VerificationResponse::from(&err);
    assert!(!body.success);
    assert_eq!(body.remaining_attempts, Some(4));

    let verified = h.engine.submit_code("01022223333", &code).await.unwrap();
    let body = VerificationResponse::from(&verified);
    assert!(body.success);
    assert_eq!(body.verified, Some(true));
}

#[tokio::test]
async fn test_duplicate_send_blocked_across_formats() {
    let h = harness(CostConfig::default());

    h.engine.request_code("01022223333").await.unwrap();
    let err = h.engine.request_code("010 2222 3333").await.unwrap_err();
    assert_eq!(err.retry_after_seconds(), Some(300));
    assert!(matches!(
        err,
        VerificationError::Throttled {
            reason: ThrottleReason::DuplicateSend,
            ..
        }
    ));
}

#[tokio::test]
async fn test_daily_spend_persisted_and_alerted() {
    let h = harness(CostConfig {
        daily_limit: 5,
        ..Default::default()
    });

    for i in 0..5 {
        h.engine
            .request_code(&format!("0101000000{}", i))
            .await
            .unwrap();
    }
    assert_eq!(h.engine.cost_guard().daily_stats().await.count, 5);

    let alerts = h.alerts.0.lock().unwrap().clone();
    assert!(alerts.contains(&AlertKind::DailyWarning));
    assert!(alerts.contains(&AlertKind::DailyLimitReached));

    // Crossing local midnight rolls the counters and persists the finished day
    h.clock.advance(chrono::Duration::hours(13));
    assert!(h.engine.cost_guard().check_rollover().await);
    assert_eq!(h.engine.cost_guard().daily_stats().await.count, 0);

    let may_10 = chrono::NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    assert_eq!(h.stats.0.lock().unwrap().get(&may_10).map(|s| s.count), Some(5));

    let prediction = h.engine.cost_guard().predict_monthly_cost().await;
    assert!(prediction.current_cost > 0.0);
    assert!(!prediction.approximate);
}
