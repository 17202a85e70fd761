use std::path::PathBuf;
use std::sync::Arc;

use analysis::{aggregate, compare, Locale, WeekWindow, WeeklyComparison};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use db::Repositories;
use notifier::html::render_report;
use notifier::sample::sample_comparison;
use notifier::sender::report_subject;
use notifier::summary::render_summary;
use notifier::{document, EmailMessage, Labels, ReportSender};
use tracing::{info, instrument, warn};

use crate::fetcher::CommitFetcher;

/// Turns "now" into a finished comparison of the last completed week
/// against the one before it.
pub struct WeeklyReporter {
    fetcher: CommitFetcher,
    author: String,
    offset: FixedOffset,
    locale: Locale,
}

impl WeeklyReporter {
    pub fn new(
        fetcher: CommitFetcher,
        author: impl Into<String>,
        offset: FixedOffset,
        locale: Locale,
    ) -> Self {
        Self {
            fetcher,
            author: author.into(),
            offset,
            locale,
        }
    }

    /// `(current, previous)` reporting windows as of `now`.
    pub fn windows(&self, now: DateTime<Utc>) -> (WeekWindow, WeekWindow) {
        let current = WeekWindow::containing(&now, self.offset);
        (current, current.previous())
    }

    #[instrument(skip(self), fields(author = %self.author))]
    pub async fn build(&self, now: DateTime<Utc>) -> Result<WeeklyComparison> {
        let (current, previous) = self.windows(now);
        info!(
            current_start = %current.start,
            current_end = %current.end,
            previous_start = %previous.start,
            "building weekly comparison"
        );

        let commits = self
            .fetcher
            .fetch(&self.author, previous.since(), current.until())
            .await
            .context("fetching commits for both weeks")?;

        let comparison = compare(
            aggregate(&commits, &current, self.locale),
            aggregate(&commits, &previous, self.locale),
        );
        info!(
            current = comparison.current.total_commits,
            previous = comparison.previous.total_commits,
            diff = comparison.commits_diff,
            "weekly comparison ready"
        );
        Ok(comparison)
    }
}

/// Sender and addresses for the report e-mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    /// Full `From` header for regular reports.
    pub from: String,
    pub to: Vec<String>,
    /// `From` header for `test-email` sends.
    pub test_from: String,
    pub test_to: Vec<String>,
}

/// Splits a comma separated recipient list.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
}

/// What a run produced; `None` marks a skipped step.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub comparison: WeeklyComparison,
    pub document: Option<PathBuf>,
    pub week_id: Option<i64>,
    pub message_id: Option<String>,
}

/// Composes and delivers report e-mails.
pub struct Mailer {
    sender: Arc<dyn ReportSender>,
    settings: EmailSettings,
    offset: FixedOffset,
    locale: Locale,
}

impl Mailer {
    pub fn new(
        sender: Arc<dyn ReportSender>,
        settings: EmailSettings,
        offset: FixedOffset,
        locale: Locale,
    ) -> Self {
        Self {
            sender,
            settings,
            offset,
            locale,
        }
    }

    pub async fn send_report(
        &self,
        comparison: &WeeklyComparison,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let message = self.compose(comparison, now, false);
        let id = self
            .sender
            .send(&message)
            .await
            .context("sending weekly report e-mail")?;
        info!(message_id = %id, recipients = message.to.len(), "weekly report sent");
        Ok(id)
    }

    /// Renders the built-in sample week and sends it to the test
    /// recipients with a test subject. Nothing is fetched or stored.
    #[instrument(skip(self))]
    pub async fn send_sample(&self, now: DateTime<Utc>) -> Result<String> {
        let comparison = sample_comparison(now, self.offset, self.locale);
        let message = self.compose(&comparison, now, true);
        let id = self
            .sender
            .send(&message)
            .await
            .context("sending test e-mail")?;
        info!(message_id = %id, "test e-mail sent");
        Ok(id)
    }

    pub fn compose(
        &self,
        comparison: &WeeklyComparison,
        now: DateTime<Utc>,
        test: bool,
    ) -> EmailMessage {
        let labels = Labels::for_locale(self.locale);
        let sent_on = now.with_timezone(&self.offset).date_naive();
        let (from, to) = if test {
            (&self.settings.test_from, &self.settings.test_to)
        } else {
            (&self.settings.from, &self.settings.to)
        };
        EmailMessage {
            from: from.clone(),
            to: to.clone(),
            subject: report_subject(labels, sent_on, test),
            html: render_report(comparison, self.locale),
        }
    }
}

pub struct ReportPipeline {
    reporter: WeeklyReporter,
    repositories: Option<Arc<dyn Repositories>>,
    mailer: Option<Mailer>,
    output_dir: Option<PathBuf>,
}

impl ReportPipeline {
    pub fn new(reporter: WeeklyReporter) -> Self {
        Self {
            reporter,
            repositories: None,
            mailer: None,
            output_dir: None,
        }
    }

    pub fn with_repositories(mut self, repositories: Arc<dyn Repositories>) -> Self {
        self.repositories = Some(repositories);
        self
    }

    pub fn with_mailer(mut self, mailer: Mailer) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    #[instrument(skip(self), fields(dry_run = options.dry_run))]
    pub async fn run(&self, now: DateTime<Utc>, options: RunOptions) -> Result<RunOutcome> {
        let comparison = self.reporter.build(now).await?;
        println!("{}", render_summary(&comparison, self.reporter.locale));

        let document = match &self.output_dir {
            Some(dir) => Some(
                document::write_json(dir, &comparison)
                    .await
                    .context("writing weekly report document")?,
            ),
            None => None,
        };

        let week_id = match (&self.repositories, options.dry_run) {
            (Some(repos), false) => {
                info!(start_date = %comparison.current.start_date, "persisting current week");
                let id = repos
                    .weekly_stats()
                    .upsert_week(&comparison.current)
                    .await
                    .context("persisting weekly stats")?;
                info!(week_id = id, "current week persisted");
                Some(id)
            }
            (Some(_), true) => {
                info!("dry run; skipping persistence");
                None
            }
            (None, _) => {
                info!("no database configured; skipping persistence");
                None
            }
        };

        let message_id = match (&self.mailer, options.dry_run) {
            (Some(mailer), false) => Some(mailer.send_report(&comparison, now).await?),
            (Some(_), true) => {
                info!("dry run; skipping e-mail");
                None
            }
            (None, _) => {
                warn!("e-mail is not configured; skipping delivery");
                None
            }
        };

        Ok(RunOutcome {
            comparison,
            document,
            week_id,
            message_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipients_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_recipients(" a@example.com, ,b@example.com "),
            vec!["a@example.com", "b@example.com"]
        );
        assert!(parse_recipients("").is_empty());
    }
}
