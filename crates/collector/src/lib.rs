pub mod client;
pub mod fetcher;
pub mod service;

pub use client::{BrokerGithubClient, CommitQuery, GithubApiError, GithubClient};
pub use fetcher::{CommitFetcher, FetchOptions};
pub use service::{
    parse_recipients, EmailSettings, Mailer, ReportPipeline, RunOptions, RunOutcome, WeeklyReporter,
};
