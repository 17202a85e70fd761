use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::FixedOffset;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::errors::{AppError, Result};

/// Structured overrides are read from `WEEKLY_LOG__<SECTION>__<KEY>`.
pub const ENV_PREFIX: &str = "WEEKLY_LOG";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from_path(".")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config: AppConfig = Self::builder(path.as_ref(), Self::environment())
            .build()?
            .try_deserialize()?;
        config.apply_env_fallbacks(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("report.excluded_repositories")
            .with_list_parse_key("api.allowed_origins")
    }

    fn builder(
        path: &Path,
        environment: Environment,
    ) -> config::ConfigBuilder<config::builder::DefaultState> {
        Config::builder()
            .add_source(
                File::with_name(path.join("config/default").to_string_lossy().as_ref())
                    .required(false),
            )
            .add_source(
                File::with_name(path.join("config/local").to_string_lossy().as_ref())
                    .required(false),
            )
            .add_source(environment)
    }

    /// Fills gaps from the flat variable names used by older deployments
    /// (`GITHUB_TOKEN`, `RESEND_API_KEY`, ...). Structured keys win.
    pub fn apply_env_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fill(&mut self.github.user, lookup("GITHUB_USER"));
        if self.github.tokens.is_empty() {
            if let Some(secret) = lookup("GITHUB_TOKEN").filter(|s| !s.is_empty()) {
                self.github.tokens.push(GithubToken {
                    id: "default".to_string(),
                    secret,
                });
            }
        }
        fill_opt(&mut self.email.api_key, lookup("RESEND_API_KEY"));
        fill_opt(&mut self.email.from_address, lookup("RESEND_EMAIL_DOMAIN"));
        fill_opt(&mut self.email.test_from_address, lookup("RESEND_EMAIL_DOMAIN_DEV"));
        fill_opt(&mut self.email.to, lookup("RESEND_EMAIL_TO"));
        fill_opt(&mut self.email.test_to, lookup("TEST_RESEND_EMAIL_TO"));
        fill_opt(&mut self.database.url, lookup("DATABASE_URL"));
    }
}

fn fill(target: &mut String, value: Option<String>) {
    if target.is_empty() {
        if let Some(value) = value {
            *target = value;
        }
    }
}

fn fill_opt(target: &mut Option<String>, value: Option<String>) {
    if target.as_deref().map_or(true, str::is_empty) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            *target = Some(value);
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubToken {
    pub id: String,
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub tokens: Vec<GithubToken>,
    #[serde(default = "GithubConfig::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "GithubConfig::default_api_base")]
    pub api_base: String,
}

impl GithubConfig {
    fn default_user_agent() -> String {
        "github-weekly-log".to_string()
    }

    fn default_api_base() -> String {
        "https://api.github.com/".to_string()
    }

    pub fn resolved_tokens(&self) -> Result<Vec<GithubToken>> {
        let tokens: Vec<GithubToken> = self
            .tokens
            .iter()
            .filter(|t| !t.secret.trim().is_empty())
            .cloned()
            .collect();
        if tokens.is_empty() {
            return Err(AppError::invalid("no GitHub tokens configured"));
        }
        Ok(tokens)
    }

    pub fn require_user(&self) -> Result<&str> {
        let user = self.user.trim();
        if user.is_empty() {
            return Err(AppError::invalid("github.user is not set"));
        }
        Ok(user)
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            tokens: Vec::new(),
            user_agent: Self::default_user_agent(),
            api_base: Self::default_api_base(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "FetchConfig::default_per_page")]
    pub per_page: u32,
    #[serde(default = "FetchConfig::default_max_inflight")]
    pub max_inflight: usize,
    #[serde(default = "FetchConfig::default_commit_concurrency")]
    pub commit_concurrency: usize,
    #[serde(default = "FetchConfig::default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "FetchConfig::default_backoff_max_ms")]
    pub backoff_max_ms: u64,
    #[serde(default = "FetchConfig::default_jitter_frac")]
    pub jitter_frac: f32,
}

impl FetchConfig {
    const fn default_per_page() -> u32 {
        100
    }

    const fn default_max_inflight() -> usize {
        8
    }

    const fn default_commit_concurrency() -> usize {
        8
    }

    const fn default_backoff_base_ms() -> u64 {
        500
    }

    const fn default_backoff_max_ms() -> u64 {
        60_000
    }

    const fn default_jitter_frac() -> f32 {
        0.2
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            per_page: Self::default_per_page(),
            max_inflight: Self::default_max_inflight(),
            commit_concurrency: Self::default_commit_concurrency(),
            backoff_base_ms: Self::default_backoff_base_ms(),
            backoff_max_ms: Self::default_backoff_max_ms(),
            jitter_frac: Self::default_jitter_frac(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "ReportConfig::default_utc_offset")]
    pub utc_offset: String,
    #[serde(default = "ReportConfig::default_locale")]
    pub locale: String,
    #[serde(default = "ReportConfig::default_excluded_repositories")]
    pub excluded_repositories: Vec<String>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl ReportConfig {
    fn default_utc_offset() -> String {
        "+09:00".to_string()
    }

    fn default_locale() -> String {
        "ja".to_string()
    }

    fn default_excluded_repositories() -> Vec<String> {
        vec!["obsidian-vault".to_string()]
    }

    pub fn fixed_offset(&self) -> Result<FixedOffset> {
        FixedOffset::from_str(self.utc_offset.trim()).map_err(|err| {
            AppError::invalid(format!(
                "report.utc_offset '{}' is not a valid offset: {err}",
                self.utc_offset
            ))
        })
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            utc_offset: Self::default_utc_offset(),
            locale: Self::default_locale(),
            excluded_repositories: Self::default_excluded_repositories(),
            output_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub test_admin_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub from_address: Option<String>,
    #[serde(default)]
    pub test_from_address: Option<String>,
    #[serde(default = "EmailConfig::default_sender_name")]
    pub sender_name: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub test_to: Option<String>,
    #[serde(default = "EmailConfig::default_api_base")]
    pub api_base: String,
}

impl EmailConfig {
    fn default_sender_name() -> String {
        "お疲れ様委員会".to_string()
    }

    fn default_api_base() -> String {
        "https://api.resend.com/".to_string()
    }

    pub fn is_configured(&self) -> bool {
        [&self.api_key, &self.from_address, &self.to]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from_address: None,
            test_from_address: None,
            sender_name: Self::default_sender_name(),
            to: None,
            test_to: None,
            api_base: Self::default_api_base(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_bind")]
    pub bind: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl ApiConfig {
    fn default_bind() -> String {
        "0.0.0.0:8080".to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "ObservabilityConfig::default_metrics_path")]
    pub metrics_path: String,
}

impl ObservabilityConfig {
    fn default_metrics_path() -> String {
        "/metrics".to_string()
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_path: Self::default_metrics_path(),
        }
    }
}
