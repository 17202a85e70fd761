use std::fmt::Write;

use analysis::models::BreakdownRow;
use analysis::{Locale, WeeklyComparison};

use crate::labels::Labels;

const RULE: &str = "========================================";
const NAME_WIDTH: usize = 20;
const TABLE_WIDTH: usize = 45;

/// Plain-text week-over-week summary printed at the end of a run.
pub fn render_summary(comparison: &WeeklyComparison, locale: Locale) -> String {
    let labels = Labels::for_locale(locale);
    let current = &comparison.current;
    let previous = &comparison.previous;
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{}", labels.comparison_title);
    let _ = writeln!(out, "{RULE}");

    let _ = writeln!(
        out,
        "\n📅 {}: {}{}{}",
        labels.this_week,
        current.start_date.format("%Y-%m-%d"),
        labels.period_separator,
        current.end_date.format("%Y-%m-%d"),
    );
    let _ = writeln!(
        out,
        "📅 {}: {}{}{}",
        labels.last_week,
        previous.start_date.format("%Y-%m-%d"),
        labels.period_separator,
        previous.end_date.format("%Y-%m-%d"),
    );

    let _ = writeln!(out, "\n📊 {}:", labels.total_commits);
    let _ = writeln!(out, "  {}: {}", labels.this_week, current.total_commits);
    let _ = writeln!(out, "  {}: {}", labels.last_week, previous.total_commits);
    let _ = writeln!(out, "  {}", change_line(comparison, labels));

    write_table(
        &mut out,
        &format!("📁 {}", labels.repos_heading),
        labels.repo_column,
        labels,
        &comparison.repo_breakdown(),
    );
    write_table(
        &mut out,
        &format!("💻 {}", labels.languages_heading),
        labels.language_column,
        labels,
        &comparison.language_breakdown(),
    );
    out
}

fn change_line(comparison: &WeeklyComparison, labels: &Labels) -> String {
    let diff = comparison.commits_diff;
    let rate = comparison.commits_change_rate;
    match diff.signum() {
        1 => format!("📈 {diff:+} ({rate}% {})", labels.increase),
        -1 => format!("📉 {diff} ({}% {})", -rate, labels.decrease),
        _ => format!("➡️  {}", labels.no_change),
    }
}

fn write_table(
    out: &mut String,
    heading: &str,
    name_column: &str,
    labels: &Labels,
    rows: &[BreakdownRow],
) {
    let _ = writeln!(out, "\n{heading}:");
    let _ = writeln!(
        out,
        "  {:<width$} {:>4}  {:>4}  {}",
        name_column,
        labels.this_week,
        labels.last_week,
        labels.diff_column,
        width = NAME_WIDTH,
    );
    let _ = writeln!(out, "  {}", "-".repeat(TABLE_WIDTH));
    for row in rows {
        let _ = writeln!(
            out,
            "  {:<width$} {:>4}  {:>4}  {}",
            row.name,
            row.current,
            row.previous,
            signed(row.diff),
            width = NAME_WIDTH,
        );
    }
}

fn signed(diff: i64) -> String {
    if diff > 0 {
        format!("+{diff}")
    } else {
        diff.to_string()
    }
}
