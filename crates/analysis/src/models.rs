use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const HOURS_PER_DAY: usize = 24;

/// One commit as delivered by the fetch layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommit {
    pub repository: String,
    pub sha: String,
    /// `None` when the author metadata was missing or unparseable.
    pub authored_at: Option<DateTime<Utc>>,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCommit {
    pub date: NaiveDate,
    pub date_label: String,
    pub weekday: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoDetail {
    pub name: String,
    pub count: u32,
    pub bar_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub total_commits: u32,
    pub daily_commits: Vec<DailyCommit>,
    pub hourly_activity: [u32; HOURS_PER_DAY],
    pub repo_details: Vec<RepoDetail>,
    pub language_commits: BTreeMap<String, u32>,
    pub main_languages: BTreeMap<String, u32>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub active_days: u32,
}

impl WeeklyStats {
    pub fn repo_count(&self, name: &str) -> u32 {
        self.repo_details
            .iter()
            .find(|r| r.name == name)
            .map_or(0, |r| r.count)
    }

    pub fn peak_hour(&self) -> Option<usize> {
        let (hour, count) = self
            .hourly_activity
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;
        (*count > 0).then_some(hour)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyComparison {
    pub current: WeeklyStats,
    pub previous: WeeklyStats,
    pub commits_diff: i64,
    pub commits_change_rate: i64,
}

/// `(name, current, previous, current - previous)` for one repository or language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownRow {
    pub name: String,
    pub current: u32,
    pub previous: u32,
    pub diff: i64,
}
