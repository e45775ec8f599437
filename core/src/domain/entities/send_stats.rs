//! Daily and monthly SMS send statistics.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Send counters for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    /// Calendar day in the configured timezone
    pub date: NaiveDate,

    /// Dispatches attempted, successful or not
    pub count: u64,

    /// Spend in currency units
    pub cost: f64,

    /// Dispatches that ultimately failed
    pub failures: u64,
}

impl DailyStats {
    /// Empty counters for `date`
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            count: 0,
            cost: 0.0,
            failures: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Successful dispatches
    pub fn successes(&self) -> u64 {
        self.count.saturating_sub(self.failures)
    }
}

/// Persisted daily snapshots for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub year: i32,
    pub month: u32,
    /// One entry per persisted day
    pub days: Vec<DailyStats>,
}

impl MonthlyAggregate {
    /// Aggregate with no persisted days
    pub fn empty(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            days: Vec::new(),
        }
    }

    /// Whether this aggregate covers the month containing `date`
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.year == date.year() && self.month == date.month()
    }

    pub fn total_cost(&self) -> f64 {
        self.days.iter().map(|d| d.cost).sum()
    }

    pub fn total_count(&self) -> u64 {
        self.days.iter().map(|d| d.count).sum()
    }

    /// Spend on every persisted day except `date`
    pub fn cost_excluding(&self, date: NaiveDate) -> f64 {
        self.days
            .iter()
            .filter(|d| d.date != date)
            .map(|d| d.cost)
            .sum()
    }

    /// Persisted snapshot for `date`, if any
    pub fn day(&self, date: NaiveDate) -> Option<&DailyStats> {
        self.days.iter().find(|d| d.date == date)
    }

    /// Insert or replace the snapshot for `stats.date`
    pub fn upsert(&mut self, stats: DailyStats) {
        match self.days.iter_mut().find(|d| d.date == stats.date) {
            Some(existing) => *existing = stats,
            None => self.days.push(stats),
        }
    }
}

/// Number of days in the month containing `date`
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(30)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month(date(2023, 2, 10)), 28);
        assert_eq!(days_in_month(date(2024, 4, 1)), 30);
        assert_eq!(days_in_month(date(2024, 12, 31)), 31);
    }

    #[test]
    fn test_aggregate_totals_and_upsert() {
        let mut agg = MonthlyAggregate::empty(2024, 5);
        agg.upsert(DailyStats { date: date(2024, 5, 1), count: 10, cost: 130.0, failures: 1 });
        agg.upsert(DailyStats { date: date(2024, 5, 2), count: 4, cost: 52.0, failures: 0 });
        agg.upsert(DailyStats { date: date(2024, 5, 2), count: 5, cost: 65.0, failures: 0 });

        assert_eq!(agg.days.len(), 2);
        assert_eq!(agg.total_count(), 15);
        assert_eq!(agg.total_cost(), 195.0);
        assert_eq!(agg.cost_excluding(date(2024, 5, 2)), 130.0);
        assert!(agg.covers(date(2024, 5, 20)));
        assert!(!agg.covers(date(2024, 6, 1)));
    }

    #[test]
    fn test_daily_successes() {
        let stats = DailyStats { date: date(2024, 5, 1), count: 10, cost: 0.0, failures: 3 };
        assert_eq!(stats.successes(), 7);
        assert!(DailyStats::new(date(2024, 5, 1)).is_empty());
    }
}
