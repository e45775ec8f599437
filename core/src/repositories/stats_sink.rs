//! Persistence for daily send statistics.

use async_trait::async_trait;

use crate::domain::entities::{DailyStats, MonthlyAggregate};
use crate::errors::DomainResult;

/// Durable home for daily send snapshots
///
/// Failures are tolerated by the caller: the cost guard logs them and keeps
/// working from memory.
#[async_trait]
pub trait StatsSink: Send + Sync {
    /// Insert or replace the snapshot for `stats.date`
    async fn persist_daily(&self, stats: &DailyStats) -> DomainResult<()>;

    /// Every persisted daily snapshot for the given month
    ///
    /// # Arguments
    /// * `year` - Calendar year
    /// * `month` - Calendar month, 1-12
    async fn load_monthly(&self, year: i32, month: u32) -> DomainResult<MonthlyAggregate>;
}
