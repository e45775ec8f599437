//! Mock implementations for testing the verification engine

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lc_shared::{CostConfig, DispatchConfig, RateLimitConfig};

use crate::clock::ManualClock;
use crate::domain::entities::VerificationCode;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::{CodeStore, LeadStore};
use crate::services::cost::tests::mocks::{MockStatsSink, RecordingAlertSink};
use crate::services::cost::CostGuard;
use crate::services::dispatch::{RetryingDispatcher, SmsError, SmsSender};
use crate::services::rate_limit::RateLimiter;
use crate::services::verification::{VerificationEngine, VerificationServiceConfig};

// Mock code store backed by a HashMap
#[derive(Default)]
pub struct MockCodeStore {
    pub codes: Mutex<HashMap<String, VerificationCode>>,
    pub should_fail: AtomicBool,
}

impl MockCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn stored(&self, phone: &str) -> Option<VerificationCode> {
        self.codes.lock().unwrap().get(phone).cloned()
    }

    fn check(&self) -> DomainResult<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::storage("code store offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl CodeStore for MockCodeStore {
    async fn put(&self, code: &VerificationCode) -> DomainResult<()> {
        self.check()?;
        self.codes
            .lock()
            .unwrap()
            .insert(code.phone.clone(), code.clone());
        Ok(())
    }

    async fn get(&self, phone: &str) -> DomainResult<Option<VerificationCode>> {
        self.check()?;
        Ok(self.codes.lock().unwrap().get(phone).cloned())
    }

    async fn increment_attempts(&self, phone: &str) -> DomainResult<Option<u32>> {
        self.check()?;
        Ok(self.codes.lock().unwrap().get_mut(phone).map(|c| {
            c.attempts += 1;
            c.attempts
        }))
    }

    async fn delete(&self, phone: &str) -> DomainResult<()> {
        self.check()?;
        self.codes.lock().unwrap().remove(phone);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        self.check()?;
        let mut codes = self.codes.lock().unwrap();
        let before = codes.len();
        codes.retain(|_, c| !c.is_purgeable_at(now));
        Ok(before - codes.len())
    }
}

// Mock lead store with a fixed set of registered phones
#[derive(Default)]
pub struct MockLeadStore {
    pub phones: Mutex<HashSet<String>>,
}

impl MockLeadStore {
    pub fn with(phones: &[&str]) -> Self {
        Self {
            phones: Mutex::new(phones.iter().map(|p| p.to_string()).collect()),
        }
    }
}

#[async_trait]
impl LeadStore for MockLeadStore {
    async fn exists(&self, phone: &str) -> DomainResult<bool> {
        Ok(self.phones.lock().unwrap().contains(phone))
    }
}

// Mock SMS sender with scripted failures
pub struct MockSmsSender {
    pub sent: Mutex<Vec<(String, String)>>,
    pub calls: AtomicU32,
    script: Mutex<VecDeque<SmsError>>,
    fail_all: Mutex<Option<SmsError>>,
    delay: Option<Duration>,
}

impl MockSmsSender {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
            script: Mutex::new(VecDeque::new()),
            fail_all: Mutex::new(None),
            delay: None,
        }
    }

    /// Fail with each error in order, then succeed
    pub fn scripted(errors: Vec<SmsError>) -> Self {
        let sender = Self::new();
        *sender.script.lock().unwrap() = errors.into();
        sender
    }

    pub fn always_failing(error: SmsError) -> Self {
        let sender = Self::new();
        sender.set_fail_all(Some(error));
        sender
    }

    /// Every send takes `delay` before answering
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn set_fail_all(&self, error: Option<SmsError>) {
        *self.fail_all.lock().unwrap() = error;
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Code from the most recent message delivered to `phone`
    pub fn last_code(&self, phone: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == phone)
            .and_then(|(_, message)| extract_code(message))
    }
}

fn extract_code(message: &str) -> Option<String> {
    message
        .split('[')
        .nth(2)
        .and_then(|rest| rest.split(']').next())
        .map(str::to_string)
}

#[async_trait]
impl SmsSender for MockSmsSender {
    async fn send(&self, phone: &str, message: &str) -> Result<String, SmsError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.fail_all.lock().unwrap().clone() {
            return Err(err);
        }
        if let Some(err) = self.script.lock().unwrap().pop_front() {
            return Err(err);
        }

        self.sent
            .lock()
            .unwrap()
            .push((phone.to_string(), message.to_string()));
        Ok(format!("mock-msg-{}", call))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

/// Fully wired engine over mocks, starting at 2024-05-10 12:00 KST
pub struct TestEngine {
    pub engine: VerificationEngine,
    pub clock: Arc<ManualClock>,
    pub codes: Arc<MockCodeStore>,
    pub leads: Arc<MockLeadStore>,
    pub sms: Arc<MockSmsSender>,
    pub stats: Arc<MockStatsSink>,
    pub alerts: Arc<RecordingAlertSink>,
}

pub struct TestEngineBuilder {
    pub config: VerificationServiceConfig,
    pub rate_limit: RateLimitConfig,
    pub cost: CostConfig,
    pub dispatch: DispatchConfig,
    pub sms: MockSmsSender,
    pub leads: MockLeadStore,
}

impl TestEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: VerificationServiceConfig {
                expose_demo_code: true,
                ..Default::default()
            },
            rate_limit: RateLimitConfig::default(),
            cost: CostConfig::default(),
            dispatch: DispatchConfig::default(),
            sms: MockSmsSender::new(),
            leads: MockLeadStore::default(),
        }
    }

    pub fn build(self) -> TestEngine {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 10, 3, 0, 0).unwrap(),
        ));
        let codes = Arc::new(MockCodeStore::new());
        let leads = Arc::new(self.leads);
        let sms = Arc::new(self.sms);
        let stats = Arc::new(MockStatsSink::new());
        let alerts = Arc::new(RecordingAlertSink::new());

        let dispatcher = Arc::new(RetryingDispatcher::new(sms.clone(), self.dispatch));
        let rate_limiter = Arc::new(RateLimiter::new(self.rate_limit, clock.clone()));
        let cost_guard = Arc::new(CostGuard::new(
            self.cost,
            clock.clone(),
            stats.clone(),
            alerts.clone(),
        ));

        let engine = VerificationEngine::new(
            codes.clone(),
            leads.clone(),
            dispatcher,
            rate_limiter,
            cost_guard,
            clock.clone(),
            self.config,
        );

        TestEngine {
            engine,
            clock,
            codes,
            leads,
            sms,
            stats,
            alerts,
        }
    }
}

pub fn test_engine() -> TestEngine {
    TestEngineBuilder::new().build()
}
