use std::sync::Arc;
use std::time::Duration;

use analysis::Locale;
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use clap::{Args, Parser, Subcommand};
use collector::{
    parse_recipients, BrokerGithubClient, CommitFetcher, EmailSettings, FetchOptions, Mailer,
    ReportPipeline, RunOptions, WeeklyReporter,
};
use common::config::{AppConfig, EmailConfig};
use common::logging;
use db::pg::PgDatabase;
use db::Repositories;
use gh_broker::{GithubBrokerBuilder, GithubToken};
use notifier::sender::from_header;
use notifier::{Labels, ResendSender};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "weekly-log", version, about = "Weekly GitHub commit report")]
struct Cli {
    /// Default log filter when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build, store and send the report for the last completed week.
    Run(RunArgs),
    /// Send the built-in sample report to the test recipients.
    TestEmail,
}

#[derive(Debug, Default, Args)]
struct RunArgs {
    /// Print and write the report without storing or sending it.
    #[arg(long)]
    dry_run: bool,

    /// Pretend the run happens at this instant (RFC 3339).
    #[arg(long, value_parser = parse_instant)]
    at: Option<DateTime<Utc>>,
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| format!("expected an RFC 3339 timestamp: {err}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let config = AppConfig::load()?;
    let offset = config.report.fixed_offset()?;
    let locale: Locale = config.report.locale.parse()?;

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => run(&config, offset, locale, args).await,
        Command::TestEmail => {
            let mailer = build_mailer(&config.email, offset, locale)?
                .context("e-mail is not configured (RESEND_API_KEY, RESEND_EMAIL_DOMAIN, RESEND_EMAIL_TO)")?;
            mailer.send_sample(Utc::now()).await?;
            Ok(())
        }
    }
}

async fn run(config: &AppConfig, offset: FixedOffset, locale: Locale, args: RunArgs) -> Result<()> {
    let user = config.github.require_user()?;
    let tokens = config
        .github
        .resolved_tokens()?
        .into_iter()
        .map(|token| GithubToken::new(token.id, token.secret))
        .collect();

    let fetch = &config.fetch;
    let broker = GithubBrokerBuilder::new(tokens)
        .user_agent(config.github.user_agent.clone())
        .max_inflight(fetch.max_inflight)
        .backoff(
            Duration::from_millis(fetch.backoff_base_ms),
            Duration::from_millis(fetch.backoff_max_ms),
            fetch.jitter_frac,
        )
        .build()?;
    let client = Arc::new(BrokerGithubClient::new(
        broker,
        config.github.user_agent.clone(),
        &config.github.api_base,
    )?);
    let fetcher = CommitFetcher::new(
        client,
        FetchOptions {
            per_page: fetch.per_page,
            commit_concurrency: fetch.commit_concurrency,
            excluded_repositories: config.report.excluded_repositories.iter().cloned().collect(),
        },
    );

    let mut pipeline = ReportPipeline::new(WeeklyReporter::new(fetcher, user, offset, locale));
    if let Some(dir) = &config.report.output_dir {
        pipeline = pipeline.with_output_dir(dir);
    }
    if let Some(url) = config.database.url.as_deref().filter(|u| !u.trim().is_empty()) {
        let database = PgDatabase::connect(url)
            .await
            .context("connecting to database")?;
        pipeline = pipeline.with_repositories(Arc::new(database) as Arc<dyn Repositories>);
    }
    if let Some(mailer) = build_mailer(&config.email, offset, locale)? {
        pipeline = pipeline.with_mailer(mailer);
    }

    let now = args.at.unwrap_or_else(Utc::now);
    let outcome = pipeline
        .run(now, RunOptions { dry_run: args.dry_run })
        .await?;
    info!(
        total_commits = outcome.comparison.current.total_commits,
        stored = outcome.week_id.is_some(),
        emailed = outcome.message_id.is_some(),
        "weekly report finished"
    );
    Ok(())
}

fn build_mailer(email: &EmailConfig, offset: FixedOffset, locale: Locale) -> Result<Option<Mailer>> {
    if !email.is_configured() {
        return Ok(None);
    }
    let (Some(api_key), Some(from_address), Some(to)) =
        (&email.api_key, &email.from_address, &email.to)
    else {
        return Ok(None);
    };

    let labels = Labels::for_locale(locale);
    let test_from_address = email.test_from_address.as_deref().unwrap_or(from_address);
    let test_to = email.test_to.as_deref().unwrap_or(to);
    let settings = EmailSettings {
        from: from_header(&email.sender_name, from_address),
        to: parse_recipients(to),
        test_from: from_header(
            &format!("{}{}", labels.test_prefix, email.sender_name),
            test_from_address,
        ),
        test_to: parse_recipients(test_to),
    };
    let sender = ResendSender::new(api_key.clone(), &email.api_base)?;
    Ok(Some(Mailer::new(Arc::new(sender), settings, offset, locale)))
}
