use analysis::Locale;

/// Fixed strings shared by the console summary, the HTML body and the
/// e-mail subject.
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub title: &'static str,
    pub comparison_title: &'static str,
    pub this_week: &'static str,
    pub last_week: &'static str,
    pub total_commits: &'static str,
    pub active_days: &'static str,
    pub increase: &'static str,
    pub decrease: &'static str,
    pub no_change: &'static str,
    pub vs_last_week: &'static str,
    pub repos_heading: &'static str,
    pub repo_column: &'static str,
    pub languages_heading: &'static str,
    pub main_languages_heading: &'static str,
    pub language_column: &'static str,
    pub diff_column: &'static str,
    pub daily_heading: &'static str,
    pub hourly_heading: &'static str,
    pub peak_hour: &'static str,
    pub no_activity: &'static str,
    pub test_prefix: &'static str,
    pub period_separator: &'static str,
}

const JA: Labels = Labels {
    title: "週間コミットレポート",
    comparison_title: "週間コミットレポート（前週比）",
    this_week: "今週",
    last_week: "先週",
    total_commits: "総コミット数",
    active_days: "アクティブ日数",
    increase: "増加",
    decrease: "減少",
    no_change: "変化なし",
    vs_last_week: "前週比",
    repos_heading: "リポジトリ別コミット数",
    repo_column: "リポジトリ名",
    languages_heading: "言語別変更ファイル数",
    main_languages_heading: "主要言語",
    language_column: "言語",
    diff_column: "差分",
    daily_heading: "日別コミット数",
    hourly_heading: "時間帯別アクティビティ",
    peak_hour: "ピーク時間帯",
    no_activity: "活動なし",
    test_prefix: "[テスト]",
    period_separator: " 〜 ",
};

const EN: Labels = Labels {
    title: "Weekly commit report",
    comparison_title: "Weekly commit report (week over week)",
    this_week: "This week",
    last_week: "Last week",
    total_commits: "Total commits",
    active_days: "Active days",
    increase: "increase",
    decrease: "decrease",
    no_change: "No change",
    vs_last_week: "vs last week",
    repos_heading: "Commits by repository",
    repo_column: "Repository",
    languages_heading: "Changed files by language",
    main_languages_heading: "Main languages",
    language_column: "Language",
    diff_column: "Diff",
    daily_heading: "Daily commits",
    hourly_heading: "Activity by hour",
    peak_hour: "Peak hour",
    no_activity: "No activity",
    test_prefix: "[TEST] ",
    period_separator: " - ",
};

impl Labels {
    pub fn for_locale(locale: Locale) -> &'static Labels {
        match locale {
            Locale::Ja => &JA,
            Locale::En => &EN,
        }
    }
}
