use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use db::models::{WeekDetail, WeeklyStatsRow};

#[derive(Debug, Serialize)]
pub struct WeekSummaryDto {
    pub id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_commits: i32,
    pub active_days: i32,
    pub created_at: DateTime<Utc>,
}

impl From<WeeklyStatsRow> for WeekSummaryDto {
    fn from(row: WeeklyStatsRow) -> Self {
        Self {
            id: row.id,
            start_date: row.start_date,
            end_date: row.end_date,
            total_commits: row.total_commits,
            active_days: row.active_days,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WeekListDto {
    pub items: Vec<WeekSummaryDto>,
}

#[derive(Debug, Serialize)]
pub struct TotalsDto {
    pub total_commits: i32,
    pub active_days: i32,
}

/// Parallel label/value arrays, the shape chart libraries consume.
#[derive(Debug, Serialize)]
pub struct SeriesDto {
    pub labels: Vec<String>,
    pub data: Vec<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSeriesDto {
    pub labels: Vec<String>,
    pub data: Vec<i32>,
    pub bar_width: Vec<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSeriesDto {
    pub labels: Vec<String>,
    pub data: Vec<i32>,
    pub is_main: Vec<bool>,
}

#[derive(Debug, Serialize)]
pub struct WeekChartsDto {
    pub summary: TotalsDto,
    pub daily: SeriesDto,
    pub hourly: SeriesDto,
    pub repos: RepoSeriesDto,
    pub languages: LanguageSeriesDto,
}

impl From<WeekDetail> for WeekChartsDto {
    fn from(detail: WeekDetail) -> Self {
        let (daily_labels, daily_data) = detail
            .daily
            .into_iter()
            .map(|d| (d.date.format("%Y-%m-%d").to_string(), d.commits))
            .unzip();
        let (hourly_labels, hourly_data) = detail
            .hourly
            .into_iter()
            .map(|h| (h.hour.to_string(), h.commits))
            .unzip();

        let mut repos = RepoSeriesDto {
            labels: Vec::with_capacity(detail.repos.len()),
            data: Vec::with_capacity(detail.repos.len()),
            bar_width: Vec::with_capacity(detail.repos.len()),
        };
        for repo in detail.repos {
            repos.labels.push(repo.repo_name);
            repos.data.push(repo.commits);
            repos.bar_width.push(repo.bar_width);
        }

        let mut languages = LanguageSeriesDto {
            labels: Vec::with_capacity(detail.languages.len()),
            data: Vec::with_capacity(detail.languages.len()),
            is_main: Vec::with_capacity(detail.languages.len()),
        };
        for lang in detail.languages {
            languages.labels.push(lang.language);
            languages.data.push(lang.commits);
            languages.is_main.push(lang.is_main);
        }

        Self {
            summary: TotalsDto {
                total_commits: detail.week.total_commits,
                active_days: detail.week.active_days,
            },
            daily: SeriesDto {
                labels: daily_labels,
                data: daily_data,
            },
            hourly: SeriesDto {
                labels: hourly_labels,
                data: hourly_data,
            },
            repos,
            languages,
        }
    }
}
