use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Timelike};
use tracing::debug;

use crate::language::{classify, is_main_language};
use crate::locale::Locale;
use crate::models::{DailyCommit, RawCommit, RepoDetail, WeeklyStats, HOURS_PER_DAY};
use crate::window::WeekWindow;

#[derive(Default)]
struct Accumulator {
    total: u32,
    days: HashMap<NaiveDate, u32>,
    hours: [u32; HOURS_PER_DAY],
    repos: HashMap<String, u32>,
    languages: BTreeMap<String, u32>,
}

impl Accumulator {
    fn record(&mut self, commit: &RawCommit, window: &WeekWindow) {
        let Some(authored_at) = commit.authored_at else {
            debug!(repo = %commit.repository, sha = %commit.sha, "skipping commit without author date");
            return;
        };
        if !window.contains(&authored_at) {
            return;
        }

        let local = authored_at.with_timezone(&window.offset);
        self.total += 1;
        *self.days.entry(local.date_naive()).or_default() += 1;
        self.hours[local.hour() as usize] += 1;
        *self.repos.entry(commit.repository.clone()).or_default() += 1;
        for file in &commit.files {
            *self.languages.entry(classify(file).to_string()).or_default() += 1;
        }
    }
}

/// Builds the statistics for one week out of an unfiltered commit list.
pub fn aggregate<'a, I>(commits: I, window: &WeekWindow, locale: Locale) -> WeeklyStats
where
    I: IntoIterator<Item = &'a RawCommit>,
{
    let mut acc = Accumulator::default();
    for commit in commits {
        acc.record(commit, window);
    }

    let daily_commits = generate_daily_commits(window.start, &acc.days, locale);
    let active_days = count_active_days(&daily_commits);
    let main_languages = filter_main_languages(&acc.languages);

    WeeklyStats {
        total_commits: acc.total,
        daily_commits,
        hourly_activity: acc.hours,
        repo_details: generate_repo_details(&acc.repos),
        language_commits: acc.languages,
        main_languages,
        start_date: window.start,
        end_date: window.end,
        active_days,
    }
}

/// Seven consecutive days from `start`, zero-filled where no commits landed.
pub fn generate_daily_commits(
    start: NaiveDate,
    counts: &HashMap<NaiveDate, u32>,
    locale: Locale,
) -> Vec<DailyCommit> {
    start
        .iter_days()
        .take(7)
        .map(|date| DailyCommit {
            date,
            date_label: format!("{}/{}", date.month(), date.day()),
            weekday: locale.weekday_label(date.weekday()).to_string(),
            count: counts.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Sorted by count descending, then name ascending. The busiest repository
/// always gets a bar of exactly 100.
pub fn generate_repo_details(counts: &HashMap<String, u32>) -> Vec<RepoDetail> {
    let max = counts.values().copied().max().unwrap_or(0);
    let mut details: Vec<RepoDetail> = counts
        .iter()
        .map(|(name, &count)| RepoDetail {
            name: name.clone(),
            count,
            bar_percent: bar_percent(count, max),
        })
        .collect();
    details.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    details
}

fn bar_percent(count: u32, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    if count == max {
        return 100.0;
    }
    f64::from(count) / f64::from(max) * 100.0
}

pub fn filter_main_languages(languages: &BTreeMap<String, u32>) -> BTreeMap<String, u32> {
    languages
        .iter()
        .filter(|(lang, _)| is_main_language(lang))
        .map(|(lang, count)| (lang.clone(), *count))
        .collect()
}

pub fn count_active_days(days: &[DailyCommit]) -> u32 {
    days.iter().filter(|d| d.count > 0).count() as u32
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeZone, Utc, Weekday};

    use super::*;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn week() -> WeekWindow {
        WeekWindow::starting_at(NaiveDate::from_ymd_opt(2026, 2, 7).unwrap(), jst())
    }

    fn jst_time(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        jst()
            .with_ymd_and_hms(2026, 2, d, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn commit(repo: &str, at: Option<DateTime<Utc>>, files: &[&str]) -> RawCommit {
        RawCommit {
            repository: repo.to_string(),
            sha: format!("{repo}-{}", at.map(|t| t.timestamp()).unwrap_or(0)),
            authored_at: at,
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn daily_commits_are_zero_filled_and_labelled() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 7).unwrap();
        let counts: HashMap<NaiveDate, u32> = [(7, 5), (8, 12), (10, 8), (11, 15), (12, 2)]
            .into_iter()
            .map(|(d, c)| (NaiveDate::from_ymd_opt(2026, 2, d).unwrap(), c))
            .collect();

        let days = generate_daily_commits(start, &counts, Locale::Ja);

        assert_eq!(days.len(), 7);
        let labels: Vec<_> = days.iter().map(|d| d.date_label.as_str()).collect();
        assert_eq!(labels, ["2/7", "2/8", "2/9", "2/10", "2/11", "2/12", "2/13"]);
        let counts: Vec<_> = days.iter().map(|d| d.count).collect();
        assert_eq!(counts, [5, 12, 0, 8, 15, 2, 0]);
        let weekdays: Vec<_> = days.iter().map(|d| d.weekday.as_str()).collect();
        assert_eq!(weekdays, ["土", "日", "月", "火", "水", "木", "金"]);
        for pair in days.windows(2) {
            assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
        }
    }

    #[test]
    fn repo_details_scale_against_the_busiest_repo() {
        let counts = HashMap::from([
            ("awesome-project".to_string(), 25),
            ("go-utils".to_string(), 12),
            ("dotfiles".to_string(), 5),
        ]);
        let details = generate_repo_details(&counts);

        assert_eq!(details.len(), 3);
        assert_eq!(details[0].name, "awesome-project");
        assert_eq!(details[0].bar_percent, 100.0);
        assert!((details[1].bar_percent - 48.0).abs() < 1e-9);
        assert!((details[2].bar_percent - 20.0).abs() < 1e-9);
        assert!(details.windows(2).all(|w| w[0].count >= w[1].count));
        assert!(details
            .iter()
            .all(|d| (0.0..=100.0).contains(&d.bar_percent)));
    }

    #[test]
    fn repo_details_single_and_empty() {
        let single = generate_repo_details(&HashMap::from([("single-repo".to_string(), 100)]));
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].bar_percent, 100.0);

        assert!(generate_repo_details(&HashMap::new()).is_empty());
    }

    #[test]
    fn repo_ties_break_by_name() {
        let counts = HashMap::from([
            ("zeta".to_string(), 3),
            ("alpha".to_string(), 3),
            ("mid".to_string(), 7),
        ]);
        let names: Vec<_> = generate_repo_details(&counts)
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, ["mid", "alpha", "zeta"]);
    }

    #[test]
    fn active_days_counts_non_zero_entries() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 7).unwrap();
        for (counts, expected) in [
            (vec![5, 12, 0, 8, 15, 2, 0], 5),
            (vec![1, 2, 3, 4, 5, 6, 7], 7),
            (vec![0; 7], 0),
        ] {
            let map: HashMap<NaiveDate, u32> = start
                .iter_days()
                .zip(counts)
                .collect();
            let days = generate_daily_commits(start, &map, Locale::En);
            assert_eq!(count_active_days(&days), expected);
        }
    }

    #[test]
    fn empty_input_yields_an_empty_week() {
        let stats = aggregate(&[], &week(), Locale::Ja);
        assert_eq!(stats.total_commits, 0);
        assert_eq!(stats.daily_commits.len(), 7);
        assert!(stats.daily_commits.iter().all(|d| d.count == 0));
        assert_eq!(stats.hourly_activity, [0; 24]);
        assert!(stats.repo_details.is_empty());
        assert!(stats.language_commits.is_empty());
        assert!(stats.main_languages.is_empty());
        assert_eq!(stats.active_days, 0);
        assert_eq!(stats.start_date.weekday(), Weekday::Sat);
        assert_eq!(stats.end_date.weekday(), Weekday::Fri);
    }

    #[test]
    fn buckets_by_local_day_hour_repo_and_language() {
        let commits = vec![
            // Saturday 00:30 JST is still Friday in UTC.
            commit("api", Some(jst_time(7, 0, 30)), &["main.go", "go.sum", "README.md"]),
            commit("api", Some(jst_time(7, 23, 59)), &["handler.go"]),
            commit("web", Some(jst_time(10, 14, 0)), &["app.tsx", "package.json"]),
            commit("web", Some(jst_time(13, 23, 0)), &["style.css"]),
            commit("dotfiles", Some(jst_time(13, 9, 0)), &[]),
        ];

        let stats = aggregate(&commits, &week(), Locale::Ja);

        assert_eq!(stats.total_commits, 5);
        let daily: Vec<_> = stats.daily_commits.iter().map(|d| d.count).collect();
        assert_eq!(daily, [2, 0, 0, 1, 0, 0, 2]);
        assert_eq!(stats.hourly_activity[0], 1);
        assert_eq!(stats.hourly_activity[23], 2);
        assert_eq!(stats.hourly_activity[14], 1);
        assert_eq!(stats.hourly_activity[9], 1);
        assert_eq!(stats.active_days, 3);

        assert_eq!(stats.repo_details[0].name, "api");
        assert_eq!(stats.repo_details[1].name, "web");
        assert_eq!(stats.repo_details[2].name, "dotfiles");
        assert_eq!(stats.repo_details[2].bar_percent, 50.0);

        assert_eq!(stats.language_commits["Go"], 3);
        assert_eq!(stats.language_commits["Markdown"], 1);
        assert_eq!(stats.language_commits["TypeScript"], 1);
        assert_eq!(stats.language_commits["JavaScript"], 1);
        assert_eq!(stats.language_commits["CSS"], 1);
        assert_eq!(stats.main_languages.len(), 3);
        assert!(!stats.main_languages.contains_key("Markdown"));
    }

    #[test]
    fn out_of_window_and_undated_commits_are_skipped() {
        let commits = vec![
            commit("api", Some(jst_time(6, 23, 59)), &["a.go"]),
            commit("api", Some(jst_time(14, 0, 0)), &["b.go"]),
            commit("api", None, &["c.go"]),
            commit("api", Some(jst_time(9, 12, 0)), &["d.go"]),
        ];

        let stats = aggregate(&commits, &week(), Locale::Ja);

        assert_eq!(stats.total_commits, 1);
        assert_eq!(stats.language_commits["Go"], 1);
        assert_eq!(stats.repo_details.len(), 1);
    }

    #[test]
    fn totals_are_consistent_across_breakdowns() {
        let commits: Vec<_> = (0..40u32)
            .map(|i| {
                let day = 7 + i % 7;
                let hour = (i * 5) % 24;
                let repo = ["a", "b", "c"][(i % 3) as usize];
                commit(repo, Some(jst_time(day, hour, i % 60)), &["x.rs"])
            })
            .collect();

        let stats = aggregate(&commits, &week(), Locale::En);

        let daily_sum: u32 = stats.daily_commits.iter().map(|d| d.count).sum();
        let hourly_sum: u32 = stats.hourly_activity.iter().sum();
        let repo_sum: u32 = stats.repo_details.iter().map(|r| r.count).sum();
        assert_eq!(stats.total_commits, 40);
        assert_eq!(daily_sum, 40);
        assert_eq!(hourly_sum, 40);
        assert_eq!(repo_sum, 40);
        assert_eq!(
            stats.active_days as usize,
            stats.daily_commits.iter().filter(|d| d.count > 0).count()
        );
    }
}
