//! MySQL daily send statistics

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySqlPool, Row};

use lc_core::domain::entities::{DailyStats, MonthlyAggregate};
use lc_core::errors::{DomainError, DomainResult};
use lc_core::repositories::StatsSink;

/// `StatsSink` over the `sms_daily_stats` table, one row per local date
pub struct MySqlStatsSink {
    pool: MySqlPool,
}

impl MySqlStatsSink {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_stats(row: &sqlx::mysql::MySqlRow) -> DomainResult<DailyStats> {
        let column_error =
            |e: sqlx::Error| DomainError::internal(format!("Malformed stats row: {}", e));

        Ok(DailyStats {
            date: row.try_get("stat_date").map_err(column_error)?,
            count: row.try_get::<i64, _>("send_count").map_err(column_error)?.max(0) as u64,
            cost: row.try_get("total_cost").map_err(column_error)?,
            failures: row.try_get::<i64, _>("failure_count").map_err(column_error)?.max(0) as u64,
        })
    }
}

/// First day of the month and first day of the following month
fn month_bounds(year: i32, month: u32) -> DomainResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1);
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(DomainError::Validation {
            message: format!("Invalid month {}-{}", year, month),
        }),
    }
}

#[async_trait]
impl StatsSink for MySqlStatsSink {
    async fn persist_daily(&self, stats: &DailyStats) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sms_daily_stats (stat_date, send_count, total_cost, failure_count)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                send_count = VALUES(send_count),
                total_cost = VALUES(total_cost),
                failure_count = VALUES(failure_count)
            "#,
        )
        .bind(stats.date)
        .bind(stats.count as i64)
        .bind(stats.cost)
        .bind(stats.failures as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to persist daily stats: {}", e)))?;

        tracing::debug!(
            date = %stats.date,
            count = stats.count,
            cost = stats.cost,
            "Persisted daily send stats"
        );
        Ok(())
    }

    async fn load_monthly(&self, year: i32, month: u32) -> DomainResult<MonthlyAggregate> {
        let (start, end) = month_bounds(year, month)?;

        let rows = sqlx::query(
            r#"
            SELECT stat_date, send_count, total_cost, failure_count
            FROM sms_daily_stats
            WHERE stat_date >= ? AND stat_date < ?
            ORDER BY stat_date
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to load monthly stats: {}", e)))?;

        let mut aggregate = MonthlyAggregate::empty(year, month);
        for row in &rows {
            aggregate.upsert(Self::row_to_stats(row)?);
        }
        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        let (_, end) = month_bounds(2024, 2).unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        assert!(month_bounds(2024, 13).is_err());
    }
}
