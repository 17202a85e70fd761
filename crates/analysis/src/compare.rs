use std::collections::BTreeSet;

use crate::models::{BreakdownRow, WeeklyComparison, WeeklyStats};

pub fn compare(current: WeeklyStats, previous: WeeklyStats) -> WeeklyComparison {
    let commits_diff = i64::from(current.total_commits) - i64::from(previous.total_commits);
    let commits_change_rate = change_rate(current.total_commits, previous.total_commits);
    WeeklyComparison {
        current,
        previous,
        commits_diff,
        commits_change_rate,
    }
}

/// Percentage change rounded to the nearest integer, half away from zero.
///
/// A week with no previous activity counts as +100% when anything happened
/// and 0% otherwise.
pub fn change_rate(current: u32, previous: u32) -> i64 {
    if previous == 0 {
        return if current > 0 { 100 } else { 0 };
    }
    let diff = f64::from(current) - f64::from(previous);
    (diff / f64::from(previous) * 100.0).round() as i64
}

impl WeeklyComparison {
    /// Every repository seen in either week, sorted by name.
    pub fn repo_breakdown(&self) -> Vec<BreakdownRow> {
        let names: BTreeSet<&str> = self
            .current
            .repo_details
            .iter()
            .chain(&self.previous.repo_details)
            .map(|r| r.name.as_str())
            .collect();
        names
            .into_iter()
            .map(|name| {
                row(
                    name,
                    self.current.repo_count(name),
                    self.previous.repo_count(name),
                )
            })
            .collect()
    }

    /// Every language (changed-file counts) seen in either week, sorted by name.
    pub fn language_breakdown(&self) -> Vec<BreakdownRow> {
        let names: BTreeSet<&str> = self
            .current
            .language_commits
            .keys()
            .chain(self.previous.language_commits.keys())
            .map(String::as_str)
            .collect();
        names
            .into_iter()
            .map(|name| {
                row(
                    name,
                    self.current.language_commits.get(name).copied().unwrap_or(0),
                    self.previous.language_commits.get(name).copied().unwrap_or(0),
                )
            })
            .collect()
    }
}

fn row(name: &str, current: u32, previous: u32) -> BreakdownRow {
    BreakdownRow {
        name: name.to_string(),
        current,
        previous,
        diff: i64::from(current) - i64::from(previous),
    }
}
