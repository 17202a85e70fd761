use analysis::WeeklyStats;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::errors::{DbError, Result};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct WeeklyStatsRow {
    pub id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_commits: i32,
    pub active_days: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct DailyCommitRow {
    pub date: NaiveDate,
    pub commits: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct HourlyActivityRow {
    pub hour: i16,
    pub commits: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct RepoDetailRow {
    pub repo_name: String,
    pub commits: i32,
    pub bar_width: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct LanguageCommitRow {
    pub language: String,
    pub commits: i32,
    pub is_main: bool,
}

/// A stored week with its breakdowns, each in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekDetail {
    pub week: WeeklyStatsRow,
    pub daily: Vec<DailyCommitRow>,
    pub hourly: Vec<HourlyActivityRow>,
    pub repos: Vec<RepoDetailRow>,
    pub languages: Vec<LanguageCommitRow>,
}

/// Column values for one week, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekRecord {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_commits: i32,
    pub active_days: i32,
    pub daily: Vec<DailyCommitRow>,
    /// Only hours with at least one commit.
    pub hourly: Vec<HourlyActivityRow>,
    pub repos: Vec<RepoDetailRow>,
    pub languages: Vec<LanguageCommitRow>,
}

fn to_i32(value: u32, what: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| DbError::OutOfRange(format!("{what} = {value}")))
}

impl WeekRecord {
    pub fn from_stats(stats: &WeeklyStats) -> Result<Self> {
        let daily = stats
            .daily_commits
            .iter()
            .map(|day| {
                Ok(DailyCommitRow {
                    date: day.date,
                    commits: to_i32(day.count, "daily commits")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let hourly = stats
            .hourly_activity
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(hour, count)| {
                Ok(HourlyActivityRow {
                    hour: hour as i16,
                    commits: to_i32(*count, "hourly commits")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let repos = stats
            .repo_details
            .iter()
            .map(|repo| {
                Ok(RepoDetailRow {
                    repo_name: repo.name.clone(),
                    commits: to_i32(repo.count, "repository commits")?,
                    // Stored as a whole percentage.
                    bar_width: repo.bar_percent.clamp(0.0, 100.0) as i32,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let languages = stats
            .language_commits
            .iter()
            .map(|(language, count)| {
                Ok(LanguageCommitRow {
                    language: language.clone(),
                    commits: to_i32(*count, "language commits")?,
                    is_main: stats.main_languages.contains_key(language),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            start_date: stats.start_date,
            end_date: stats.end_date,
            total_commits: to_i32(stats.total_commits, "total commits")?,
            active_days: to_i32(stats.active_days, "active days")?,
            daily,
            hourly,
            repos,
            languages,
        })
    }
}
