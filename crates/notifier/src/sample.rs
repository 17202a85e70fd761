use std::collections::{BTreeMap, HashMap};

use analysis::aggregate::{
    count_active_days, filter_main_languages, generate_daily_commits, generate_repo_details,
};
use analysis::models::HOURS_PER_DAY;
use analysis::{compare, Locale, WeekWindow, WeeklyComparison, WeeklyStats};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

struct SampleWeek<'a> {
    daily: [u32; 7],
    hourly: [u32; HOURS_PER_DAY],
    repos: &'a [(&'a str, u32)],
    languages: &'a [(&'a str, u32)],
}

const CURRENT: SampleWeek<'static> = SampleWeek {
    daily: [5, 12, 0, 8, 15, 2, 0],
    hourly: [
        0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 4, 5, 3, 2, 4, 5, 6, 4, 3, 2, 1, 1, 0, 0,
    ],
    repos: &[("awesome-project", 25), ("go-utils", 12), ("dotfiles", 5)],
    languages: &[("Go", 120), ("TypeScript", 85), ("Python", 30)],
};

const PREVIOUS: SampleWeek<'static> = SampleWeek {
    daily: [3, 8, 0, 12, 7, 0, 0],
    hourly: [
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 3, 3, 2, 3, 4, 3, 3, 2, 2, 2, 1, 0, 0,
    ],
    repos: &[("awesome-project", 18), ("go-utils", 8), ("dotfiles", 4)],
    languages: &[("Go", 90), ("TypeScript", 60), ("Python", 20)],
};

/// Fixed demo data for the week that most recently ended before `now`:
/// 42 commits against 30 the week before.
pub fn sample_comparison(
    now: DateTime<Utc>,
    offset: FixedOffset,
    locale: Locale,
) -> WeeklyComparison {
    let window = WeekWindow::containing(&now, offset);
    let previous = window.previous();
    compare(
        build_week(&CURRENT, window.start, window.end, locale),
        build_week(&PREVIOUS, previous.start, previous.end, locale),
    )
}

fn build_week(
    sample: &SampleWeek<'_>,
    start: NaiveDate,
    end: NaiveDate,
    locale: Locale,
) -> WeeklyStats {
    let day_counts: HashMap<NaiveDate, u32> = start.iter_days().zip(sample.daily).collect();
    let daily_commits = generate_daily_commits(start, &day_counts, locale);
    let repo_counts: HashMap<String, u32> = sample
        .repos
        .iter()
        .map(|(name, count)| (name.to_string(), *count))
        .collect();
    let language_commits: BTreeMap<String, u32> = sample
        .languages
        .iter()
        .map(|(name, count)| (name.to_string(), *count))
        .collect();

    WeeklyStats {
        total_commits: sample.daily.iter().sum(),
        active_days: count_active_days(&daily_commits),
        daily_commits,
        hourly_activity: sample.hourly,
        repo_details: generate_repo_details(&repo_counts),
        main_languages: filter_main_languages(&language_commits),
        language_commits,
        start_date: start,
        end_date: end,
    }
}
