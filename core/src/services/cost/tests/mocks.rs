//! Mock stats and alert sinks for testing cost accounting

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{Datelike, NaiveDate};

use crate::domain::entities::{DailyStats, MonthlyAggregate};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::StatsSink;
use crate::services::cost::{AlertKind, AlertSink};

// In-memory stats sink that can be switched into a failing mode
#[derive(Default)]
pub struct MockStatsSink {
    pub days: Mutex<BTreeMap<NaiveDate, DailyStats>>,
    pub fail: AtomicBool,
}

impl MockStatsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sink = Self::default();
        sink.fail.store(true, Ordering::SeqCst);
        sink
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn seed(&self, stats: DailyStats) {
        self.days.lock().unwrap().insert(stats.date, stats);
    }

    pub fn get(&self, date: NaiveDate) -> Option<DailyStats> {
        self.days.lock().unwrap().get(&date).cloned()
    }
}

#[async_trait]
impl StatsSink for MockStatsSink {
    async fn persist_daily(&self, stats: &DailyStats) -> DomainResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::storage("stats store offline"));
        }
        self.days.lock().unwrap().insert(stats.date, stats.clone());
        Ok(())
    }

    async fn load_monthly(&self, year: i32, month: u32) -> DomainResult<MonthlyAggregate> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::storage("stats store offline"));
        }
        let days = self
            .days
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.date.year() == year && d.date.month() == month)
            .cloned()
            .collect();
        Ok(MonthlyAggregate { year, month, days })
    }
}

// Alert sink that records every notification
#[derive(Default)]
pub struct RecordingAlertSink {
    pub alerts: Mutex<Vec<(AlertKind, String)>>,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<AlertKind> {
        self.alerts.lock().unwrap().iter().map(|(k, _)| *k).collect()
    }
}

#[async_trait]
impl AlertSink for RecordingAlertSink {
    async fn notify(&self, kind: AlertKind, message: &str) {
        self.alerts.lock().unwrap().push((kind, message.to_string()));
    }
}
