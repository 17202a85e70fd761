use std::sync::Arc;

use analysis::WeeklyStats;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder, Transaction};
use tokio::time::{sleep, Duration};
use tracing::{debug, instrument, warn};

use crate::errors::{DbError, Result};
use crate::models::{
    DailyCommitRow, HourlyActivityRow, LanguageCommitRow, RepoDetailRow, WeekDetail, WeekRecord,
    WeeklyStatsRow,
};
use crate::repositories::{Repositories, WeeklyStatsRepository};

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(DbError::Migration)
}

#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
    weekly_stats_repo: Arc<PgWeeklyStatsRepository>,
}

impl PgDatabase {
    pub async fn connect(database_url: &str) -> Result<Self> {
        const MAX_ATTEMPTS: u32 = 5;
        const BASE_DELAY_MS: u64 = 500;

        let mut attempts = 0;
        loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
            {
                Ok(pool) => {
                    run_migrations(&pool).await?;
                    return Ok(Self::from_pool(pool));
                }
                Err(err) => {
                    attempts += 1;
                    if attempts >= MAX_ATTEMPTS {
                        return Err(DbError::Query(err));
                    }

                    let exp = (attempts - 1).min(5);
                    let backoff = Duration::from_millis(BASE_DELAY_MS * (1u64 << exp));
                    warn!(
                        attempts,
                        error = %err,
                        wait_ms = backoff.as_millis(),
                        "database connection failed; retrying"
                    );
                    sleep(backoff).await;
                }
            }
        }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let weekly_stats_repo = Arc::new(PgWeeklyStatsRepository { pool: pool.clone() });
        Self {
            pool,
            weekly_stats_repo,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Repositories for PgDatabase {
    fn weekly_stats(&self) -> &dyn WeeklyStatsRepository {
        self.weekly_stats_repo.as_ref()
    }
}

pub struct PgWeeklyStatsRepository {
    pool: PgPool,
}

const WEEK_COLUMNS: &str = "id, start_date, end_date, total_commits, active_days, created_at";

async fn replace_breakdowns(
    tx: &mut Transaction<'_, Postgres>,
    week_id: i64,
    record: &WeekRecord,
) -> Result<()> {
    for table in [
        "daily_commits",
        "hourly_activity",
        "repo_details",
        "language_commits",
    ] {
        sqlx::query(&format!("DELETE FROM {table} WHERE weekly_stats_id = $1"))
            .bind(week_id)
            .execute(&mut **tx)
            .await
            .map_err(DbError::Query)?;
    }

    if !record.daily.is_empty() {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO daily_commits (weekly_stats_id, date, commits) ",
        );
        builder.push_values(&record.daily, |mut row, day| {
            row.push_bind(week_id).push_bind(day.date).push_bind(day.commits);
        });
        builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(DbError::Query)?;
    }

    if !record.hourly.is_empty() {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO hourly_activity (weekly_stats_id, hour, commits) ",
        );
        builder.push_values(&record.hourly, |mut row, hour| {
            row.push_bind(week_id).push_bind(hour.hour).push_bind(hour.commits);
        });
        builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(DbError::Query)?;
    }

    if !record.repos.is_empty() {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO repo_details (weekly_stats_id, repo_name, commits, bar_width) ",
        );
        builder.push_values(&record.repos, |mut row, repo| {
            row.push_bind(week_id)
                .push_bind(&repo.repo_name)
                .push_bind(repo.commits)
                .push_bind(repo.bar_width);
        });
        builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(DbError::Query)?;
    }

    if !record.languages.is_empty() {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO language_commits (weekly_stats_id, language, commits, is_main) ",
        );
        builder.push_values(&record.languages, |mut row, lang| {
            row.push_bind(week_id)
                .push_bind(&lang.language)
                .push_bind(lang.commits)
                .push_bind(lang.is_main);
        });
        builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(DbError::Query)?;
    }

    Ok(())
}

#[async_trait]
impl WeeklyStatsRepository for PgWeeklyStatsRepository {
    #[instrument(skip(self, stats), fields(start_date = %stats.start_date))]
    async fn upsert_week(&self, stats: &WeeklyStats) -> Result<i64> {
        let record = WeekRecord::from_stats(stats)?;
        let mut tx = self.pool.begin().await.map_err(DbError::Query)?;

        let week_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO weekly_stats (start_date, end_date, total_commits, active_days)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (start_date) DO UPDATE SET
                end_date = EXCLUDED.end_date,
                total_commits = EXCLUDED.total_commits,
                active_days = EXCLUDED.active_days,
                updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.total_commits)
        .bind(record.active_days)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::Query)?;

        replace_breakdowns(&mut tx, week_id, &record).await?;
        tx.commit().await.map_err(DbError::Query)?;

        debug!(
            week_id,
            repos = record.repos.len(),
            languages = record.languages.len(),
            "stored weekly stats"
        );
        Ok(week_id)
    }

    async fn list_weeks(&self) -> Result<Vec<WeeklyStatsRow>> {
        sqlx::query_as::<_, WeeklyStatsRow>(&format!(
            "SELECT {WEEK_COLUMNS} FROM weekly_stats ORDER BY start_date DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::Query)
    }

    async fn get_week(&self, id: i64) -> Result<Option<WeeklyStatsRow>> {
        sqlx::query_as::<_, WeeklyStatsRow>(&format!(
            "SELECT {WEEK_COLUMNS} FROM weekly_stats WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::Query)
    }

    #[instrument(skip(self))]
    async fn get_week_detail(&self, id: i64) -> Result<Option<WeekDetail>> {
        let Some(week) = self.get_week(id).await? else {
            return Ok(None);
        };

        let daily = sqlx::query_as::<_, DailyCommitRow>(
            "SELECT date, commits FROM daily_commits WHERE weekly_stats_id = $1 ORDER BY date ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::Query)?;

        let hourly = sqlx::query_as::<_, HourlyActivityRow>(
            "SELECT hour, commits FROM hourly_activity WHERE weekly_stats_id = $1 ORDER BY hour ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::Query)?;

        let repos = sqlx::query_as::<_, RepoDetailRow>(
            r#"
            SELECT repo_name, commits, bar_width FROM repo_details
            WHERE weekly_stats_id = $1
            ORDER BY commits DESC, repo_name ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::Query)?;

        let languages = sqlx::query_as::<_, LanguageCommitRow>(
            r#"
            SELECT language, commits, is_main FROM language_commits
            WHERE weekly_stats_id = $1
            ORDER BY commits DESC, language ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::Query)?;

        Ok(Some(WeekDetail {
            week,
            daily,
            hourly,
            repos,
            languages,
        }))
    }
}
