use std::fmt::Write;

use analysis::{Locale, WeeklyComparison, WeeklyStats};

use crate::labels::Labels;

const ACCENT: &str = "#2da44e";
const MUTED: &str = "#57606a";

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Self-contained HTML e-mail body with inline styles only.
pub fn render_report(comparison: &WeeklyComparison, locale: Locale) -> String {
    let labels = Labels::for_locale(locale);
    let current = &comparison.current;
    let mut out = String::with_capacity(8 * 1024);

    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n\
         <body style=\"margin:0;padding:24px;background:#f6f8fa;font-family:-apple-system,'Segoe UI',sans-serif;color:#24292f;\">\n\
         <div style=\"max-width:640px;margin:0 auto;background:#ffffff;border-radius:8px;padding:24px;\">\n",
        lang = locale.as_str(),
        title = escape(labels.title),
    );
    let _ = writeln!(
        out,
        "<h1 style=\"font-size:22px;margin:0 0 4px;\">{}</h1>",
        escape(labels.title)
    );
    let _ = writeln!(
        out,
        "<p style=\"margin:0 0 20px;color:{MUTED};\">{}{}{}</p>",
        current.start_date.format("%Y/%m/%d"),
        escape(labels.period_separator),
        current.end_date.format("%Y/%m/%d"),
    );

    write_overview(&mut out, comparison, labels);
    write_daily(&mut out, current, labels);
    write_hourly(&mut out, current, labels);
    write_repos(&mut out, current, labels);
    write_languages(&mut out, comparison, labels);

    out.push_str("</div>\n</body>\n</html>\n");
    out
}

fn write_overview(out: &mut String, comparison: &WeeklyComparison, labels: &Labels) {
    let current = &comparison.current;
    let (arrow, color) = match comparison.commits_diff.signum() {
        1 => ("▲", ACCENT),
        -1 => ("▼", "#cf222e"),
        _ => ("→", MUTED),
    };
    let _ = writeln!(
        out,
        "<table role=\"presentation\" style=\"width:100%;border-collapse:collapse;margin-bottom:24px;\"><tr>\n\
         <td style=\"padding:12px;background:#f6f8fa;border-radius:6px;\">\
         <div style=\"font-size:12px;color:{MUTED};\">{total_label}</div>\
         <div style=\"font-size:28px;font-weight:bold;\">{total}</div>\
         <div style=\"font-size:13px;color:{color};\">{vs} {arrow} {diff:+} ({rate:+}%)</div></td>\n\
         <td style=\"padding:12px;background:#f6f8fa;border-radius:6px;\">\
         <div style=\"font-size:12px;color:{MUTED};\">{active_label}</div>\
         <div style=\"font-size:28px;font-weight:bold;\">{active} / 7</div></td>\n\
         </tr></table>",
        total_label = escape(labels.total_commits),
        total = current.total_commits,
        vs = escape(labels.vs_last_week),
        diff = comparison.commits_diff,
        rate = comparison.commits_change_rate,
        active_label = escape(labels.active_days),
        active = current.active_days,
    );
}

fn heading(out: &mut String, text: &str) {
    let _ = writeln!(
        out,
        "<h2 style=\"font-size:16px;margin:24px 0 8px;\">{}</h2>",
        escape(text)
    );
}

fn bar(width_percent: f64, color: &str) -> String {
    format!(
        "<div style=\"background:{color};height:10px;border-radius:3px;width:{:.1}%;\"></div>",
        width_percent.clamp(0.0, 100.0)
    )
}

fn write_daily(out: &mut String, week: &WeeklyStats, labels: &Labels) {
    heading(out, labels.daily_heading);
    let max = week.daily_commits.iter().map(|d| d.count).max().unwrap_or(0);
    out.push_str("<table role=\"presentation\" style=\"width:100%;border-collapse:collapse;\">\n");
    for day in &week.daily_commits {
        let width = if max == 0 {
            0.0
        } else {
            f64::from(day.count) / f64::from(max) * 100.0
        };
        let _ = writeln!(
            out,
            "<tr><td style=\"width:72px;padding:3px 0;\">{} ({})</td>\
             <td style=\"padding:3px 8px;\">{}</td>\
             <td style=\"width:32px;text-align:right;\">{}</td></tr>",
            escape(&day.date_label),
            escape(&day.weekday),
            bar(width, ACCENT),
            day.count,
        );
    }
    out.push_str("</table>\n");
}

fn write_hourly(out: &mut String, week: &WeeklyStats, labels: &Labels) {
    heading(out, labels.hourly_heading);
    let max = week.hourly_activity.iter().copied().max().unwrap_or(0);
    out.push_str("<table role=\"presentation\" style=\"width:100%;border-collapse:collapse;table-layout:fixed;\"><tr>\n");
    for (hour, count) in week.hourly_activity.iter().enumerate() {
        let shade = if max == 0 {
            0.0
        } else {
            f64::from(*count) / f64::from(max)
        };
        let _ = writeln!(
            out,
            "<td title=\"{hour}:00 ({count})\" style=\"height:24px;background:rgba(45,164,78,{shade:.2});border:1px solid #ffffff;\"></td>"
        );
    }
    out.push_str("</tr><tr>\n");
    for hour in (0..24).step_by(6) {
        let _ = writeln!(
            out,
            "<td colspan=\"6\" style=\"font-size:11px;color:{MUTED};\">{hour}:00</td>"
        );
    }
    out.push_str("</tr></table>\n");
    let peak = match week.peak_hour() {
        Some(hour) => format!("{}: {hour}:00", escape(labels.peak_hour)),
        None => escape(labels.no_activity),
    };
    let _ = writeln!(
        out,
        "<p style=\"font-size:12px;color:{MUTED};margin:4px 0 0;\">{peak}</p>"
    );
}

fn write_repos(out: &mut String, week: &WeeklyStats, labels: &Labels) {
    heading(out, labels.repos_heading);
    if week.repo_details.is_empty() {
        let _ = writeln!(out, "<p style=\"color:{MUTED};\">{}</p>", escape(labels.no_activity));
        return;
    }
    out.push_str("<table role=\"presentation\" style=\"width:100%;border-collapse:collapse;\">\n");
    for repo in &week.repo_details {
        let _ = writeln!(
            out,
            "<tr><td style=\"width:160px;padding:3px 0;word-break:break-all;\">{}</td>\
             <td style=\"padding:3px 8px;\">{}</td>\
             <td style=\"width:32px;text-align:right;\">{}</td></tr>",
            escape(&repo.name),
            bar(repo.bar_percent, "#0969da"),
            repo.count,
        );
    }
    out.push_str("</table>\n");
}

fn write_languages(out: &mut String, comparison: &WeeklyComparison, labels: &Labels) {
    heading(out, labels.main_languages_heading);
    let current = &comparison.current.main_languages;
    if current.is_empty() {
        let _ = writeln!(out, "<p style=\"color:{MUTED};\">{}</p>", escape(labels.no_activity));
        return;
    }

    let mut rows: Vec<(&String, &u32)> = current.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let _ = writeln!(
        out,
        "<table role=\"presentation\" style=\"width:100%;border-collapse:collapse;\">\n\
         <tr style=\"font-size:12px;color:{MUTED};\"><td>{}</td>\
         <td style=\"text-align:right;\">{}</td><td style=\"text-align:right;\">{}</td></tr>",
        escape(labels.language_column),
        escape(labels.this_week),
        escape(labels.last_week),
    );
    for (name, count) in rows {
        let previous = comparison
            .previous
            .main_languages
            .get(name)
            .copied()
            .unwrap_or(0);
        let _ = writeln!(
            out,
            "<tr><td style=\"padding:3px 0;\">{}</td>\
             <td style=\"text-align:right;\">{count}</td>\
             <td style=\"text-align:right;color:{MUTED};\">{previous}</td></tr>",
            escape(name),
        );
    }
    out.push_str("</table>\n");
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};

    use super::*;
    use crate::sample::sample_comparison;

    fn sample(locale: Locale) -> WeeklyComparison {
        let now = Utc.with_ymd_and_hms(2026, 2, 14, 1, 0, 0).unwrap();
        sample_comparison(now, FixedOffset::east_opt(9 * 3600).unwrap(), locale)
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn report_contains_every_section() {
        let html = render_report(&sample(Locale::Ja), Locale::Ja);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<html lang=\"ja\">"));
        assert!(html.contains("2026/02/07 〜 2026/02/13"));
        assert!(html.contains("日別コミット数"));
        assert!(html.contains("2/7 (土)"));
        assert!(html.contains("時間帯別アクティビティ"));
        assert!(html.contains("ピーク時間帯: 16:00"));
        assert!(html.contains("awesome-project"));
        assert!(html.contains("width:100.0%"));
        assert!(html.contains("width:48.0%"));
        assert!(html.contains("+12 (+40%)"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn repository_names_are_escaped() {
        let mut cmp = sample(Locale::En);
        cmp.current.repo_details[0].name = "<script>alert(1)</script>".to_string();
        let html = render_report(&cmp, Locale::En);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn empty_week_renders_placeholders() {
        let mut cmp = sample(Locale::En);
        cmp.current.repo_details.clear();
        cmp.current.main_languages.clear();
        cmp.current.hourly_activity = [0; 24];
        let html = render_report(&cmp, Locale::En);
        assert!(html.contains("No activity"));
        assert!(!html.contains("Peak hour"));
    }
}
