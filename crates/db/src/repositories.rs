use async_trait::async_trait;

use analysis::WeeklyStats;

use crate::errors::Result;
use crate::models::{WeekDetail, WeeklyStatsRow};

#[async_trait]
pub trait WeeklyStatsRepository: Send + Sync {
    /// Stores one week keyed by its start date, replacing any earlier
    /// snapshot and all of its breakdown rows. Returns the week id.
    async fn upsert_week(&self, stats: &WeeklyStats) -> Result<i64>;
    /// All stored weeks, newest start date first.
    async fn list_weeks(&self) -> Result<Vec<WeeklyStatsRow>>;
    async fn get_week(&self, id: i64) -> Result<Option<WeeklyStatsRow>>;
    async fn get_week_detail(&self, id: i64) -> Result<Option<WeekDetail>>;
}

pub trait Repositories: Send + Sync {
    fn weekly_stats(&self) -> &dyn WeeklyStatsRepository;
}
