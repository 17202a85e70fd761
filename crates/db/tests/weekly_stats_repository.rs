use std::collections::BTreeMap;

use analysis::{DailyCommit, RepoDetail, WeeklyStats};
use chrono::NaiveDate;
use db::pg::PgDatabase;
use db::Repositories;
use db_test_fixture::DbFixture;

fn week(start: NaiveDate, repos: &[(&str, u32)]) -> WeeklyStats {
    let total: u32 = repos.iter().map(|(_, c)| c).sum();
    let max = repos.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let mut hourly = [0; 24];
    hourly[10] = total;
    WeeklyStats {
        total_commits: total,
        daily_commits: start
            .iter_days()
            .take(7)
            .enumerate()
            .map(|(i, date)| DailyCommit {
                date,
                date_label: date.format("%-m/%-d").to_string(),
                weekday: String::new(),
                count: if i == 2 { total } else { 0 },
            })
            .collect(),
        hourly_activity: hourly,
        repo_details: repos
            .iter()
            .map(|(name, count)| RepoDetail {
                name: name.to_string(),
                count: *count,
                bar_percent: f64::from(*count) / f64::from(max) * 100.0,
            })
            .collect(),
        language_commits: BTreeMap::from([("Rust".to_string(), total), ("YAML".to_string(), 1)]),
        main_languages: BTreeMap::from([("Rust".to_string(), total)]),
        start_date: start,
        end_date: start + chrono::Duration::days(6),
        active_days: u32::from(total > 0),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn upsert_replaces_previous_snapshot() -> anyhow::Result<()> {
    let Some(fixture) = DbFixture::try_from_env() else {
        return Ok(());
    };
    let handle = fixture.create("weekly_upsert").await?;
    let db = PgDatabase::from_pool(handle.pool().clone());
    let repo = db.weekly_stats();

    let start = date(2026, 2, 7);
    let first = repo.upsert_week(&week(start, &[("alpha", 4), ("beta", 2)])).await?;
    let second = repo.upsert_week(&week(start, &[("gamma", 3)])).await?;
    assert_eq!(first, second);

    let detail = repo.get_week_detail(first).await?.expect("week exists");
    assert_eq!(detail.week.total_commits, 3);
    assert_eq!(detail.repos.len(), 1);
    assert_eq!(detail.repos[0].repo_name, "gamma");
    assert_eq!(detail.daily.len(), 7);
    assert_eq!(detail.hourly.len(), 1);
    assert_eq!(detail.hourly[0].hour, 10);
    assert_eq!(repo.list_weeks().await?.len(), 1);

    handle.cleanup().await
}

#[tokio::test]
async fn listing_and_detail_follow_display_order() -> anyhow::Result<()> {
    let Some(fixture) = DbFixture::try_from_env() else {
        return Ok(());
    };
    let handle = fixture.create("weekly_order").await?;
    let db = PgDatabase::from_pool(handle.pool().clone());
    let repo = db.weekly_stats();

    repo.upsert_week(&week(date(2026, 1, 31), &[("old", 1)])).await?;
    let latest = repo
        .upsert_week(&week(date(2026, 2, 7), &[("small", 1), ("big", 5), ("mid", 3)]))
        .await?;

    let weeks = repo.list_weeks().await?;
    let starts: Vec<NaiveDate> = weeks.iter().map(|w| w.start_date).collect();
    assert_eq!(starts, vec![date(2026, 2, 7), date(2026, 1, 31)]);

    let detail = repo.get_week_detail(latest).await?.expect("week exists");
    let names: Vec<&str> = detail.repos.iter().map(|r| r.repo_name.as_str()).collect();
    assert_eq!(names, vec!["big", "mid", "small"]);
    assert_eq!(detail.repos[0].bar_width, 100);
    assert_eq!(detail.repos[1].bar_width, 60);
    assert!(detail.daily.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(detail.languages[0].language, "Rust");
    assert!(detail.languages[0].is_main);
    assert!(!detail.languages[1].is_main);

    handle.cleanup().await
}

#[tokio::test]
async fn unknown_week_is_none() -> anyhow::Result<()> {
    let Some(fixture) = DbFixture::try_from_env() else {
        return Ok(());
    };
    let handle = fixture.create("weekly_missing").await?;
    let db = PgDatabase::from_pool(handle.pool().clone());

    assert!(db.weekly_stats().get_week(42).await?.is_none());
    assert!(db.weekly_stats().get_week_detail(42).await?.is_none());

    handle.cleanup().await
}
