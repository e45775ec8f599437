//! Map-backed daily statistics sink

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use lc_core::domain::entities::{DailyStats, MonthlyAggregate};
use lc_core::errors::DomainResult;
use lc_core::repositories::StatsSink;

/// Daily snapshots kept in process memory, one per date
#[derive(Default)]
pub struct InMemoryStatsSink {
    days: RwLock<BTreeMap<NaiveDate, DailyStats>>,
}

impl InMemoryStatsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, date: NaiveDate) -> Option<DailyStats> {
        self.days.read().await.get(&date).cloned()
    }
}

#[async_trait]
impl StatsSink for InMemoryStatsSink {
    async fn persist_daily(&self, stats: &DailyStats) -> DomainResult<()> {
        self.days.write().await.insert(stats.date, stats.clone());
        Ok(())
    }

    async fn load_monthly(&self, year: i32, month: u32) -> DomainResult<MonthlyAggregate> {
        let days = self.days.read().await;
        let mut aggregate = MonthlyAggregate::empty(year, month);
        for stats in days
            .values()
            .filter(|s| s.date.year() == year && s.date.month() == month)
        {
            aggregate.upsert(stats.clone());
        }
        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32, count: u64) -> DailyStats {
        DailyStats {
            count,
            cost: count as f64 * 13.0,
            ..DailyStats::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
        }
    }

    #[tokio::test]
    async fn test_snapshot_overwrites_same_day() {
        let sink = InMemoryStatsSink::new();
        sink.persist_daily(&day(2024, 5, 10, 3)).await.unwrap();
        sink.persist_daily(&day(2024, 5, 10, 7)).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert_eq!(sink.get(date).await.unwrap().count, 7);
    }

    #[tokio::test]
    async fn test_load_monthly_filters_by_month() {
        let sink = InMemoryStatsSink::new();
        sink.persist_daily(&day(2024, 4, 30, 10)).await.unwrap();
        sink.persist_daily(&day(2024, 5, 1, 2)).await.unwrap();
        sink.persist_daily(&day(2024, 5, 2, 4)).await.unwrap();

        let may = sink.load_monthly(2024, 5).await.unwrap();
        assert_eq!(may.days.len(), 2);
        assert_eq!(may.total_count(), 6);
        assert_eq!(may.total_cost(), 78.0);
    }
}
