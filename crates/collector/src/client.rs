use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use gh_broker::{GithubBroker, HttpStatusError};
use http::{header, Request, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

#[derive(Debug, Error)]
pub enum GithubApiError {
    #[error("github api error: {status} for {endpoint}")]
    Http {
        status: StatusCode,
        endpoint: String,
    },
    #[error("unexpected response shape for {endpoint}: expected {expected}")]
    Shape {
        endpoint: String,
        expected: &'static str,
    },
}

impl GithubApiError {
    pub fn status(status: StatusCode, endpoint: impl Into<String>) -> Self {
        Self::Http {
            status,
            endpoint: endpoint.into(),
        }
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        match *self {
            GithubApiError::Http { status, .. } => Some(status),
            GithubApiError::Shape { .. } => None,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            GithubApiError::Http { endpoint, .. } | GithubApiError::Shape { endpoint, .. } => {
                endpoint.as_str()
            }
        }
    }
}

/// Filter for `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone)]
pub struct CommitQuery<'a> {
    pub author: &'a str,
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

#[async_trait]
pub trait GithubClient: Send + Sync {
    /// Repositories the authenticated user owns, collaborates on, or reaches
    /// through an organisation, most recently pushed first.
    async fn list_user_repos(&self, page: u32, per_page: u32) -> Result<Vec<Value>>;

    /// One page of commits. An empty repository yields an empty page.
    async fn list_repo_commits(
        &self,
        owner: &str,
        repo: &str,
        query: &CommitQuery<'_>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>>;

    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<Value>;
}

pub struct BrokerGithubClient {
    broker: Arc<dyn GithubBroker>,
    base: Url,
    user_agent: String,
}

impl BrokerGithubClient {
    pub fn new(broker: Arc<dyn GithubBroker>, user_agent: String, api_base: &str) -> Result<Self> {
        let base = Url::parse(api_base)
            .map_err(|err| anyhow!("invalid GitHub api base '{api_base}': {err}"))?;
        Ok(Self {
            broker,
            base,
            user_agent,
        })
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        let endpoint = url.path().trim_start_matches('/').to_string();
        debug!(endpoint = %endpoint, url = %url, "Dispatching GitHub request");
        let response = match self.execute(url).await {
            Ok(resp) => resp,
            Err(err) => {
                if let Some(status_err) = err.downcast_ref::<HttpStatusError>() {
                    return Err(GithubApiError::status(status_err.status, endpoint).into());
                }
                return Err(err);
            }
        };
        let status = response.status();
        if status.is_success() {
            Ok(serde_json::from_slice(response.body())?)
        } else {
            Err(GithubApiError::status(status, endpoint).into())
        }
    }

    async fn get_json_array(&self, url: Url) -> Result<Vec<Value>> {
        let endpoint = url.path().trim_start_matches('/').to_string();
        match self.get_json(url).await? {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            _ => Err(GithubApiError::Shape {
                endpoint,
                expected: "array",
            }
            .into()),
        }
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn execute(&self, url: Url) -> Result<http::Response<Vec<u8>>> {
        let uri: http::Uri = url.as_str().parse()?;
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::USER_AGENT, self.user_agent.clone())
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .body(Vec::new())?;

        self.broker.execute(request).await
    }

    fn join(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    fn with_query(url: &mut Url, params: &[(&str, String)]) {
        let mut query_pairs = url.query_pairs_mut();
        for (key, val) in params {
            query_pairs.append_pair(key, val);
        }
    }
}

fn is_conflict(err: &anyhow::Error) -> bool {
    err.downcast_ref::<GithubApiError>()
        .and_then(GithubApiError::status_code)
        == Some(StatusCode::CONFLICT)
}

#[async_trait]
impl GithubClient for BrokerGithubClient {
    async fn list_user_repos(&self, page: u32, per_page: u32) -> Result<Vec<Value>> {
        let mut url = self.join("user/repos")?;
        let params = [
            (
                "affiliation",
                "owner,collaborator,organization_member".to_string(),
            ),
            ("sort", "pushed".to_string()),
            ("direction", "desc".to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        Self::with_query(&mut url, &params);
        self.get_json_array(url).await
    }

    async fn list_repo_commits(
        &self,
        owner: &str,
        repo: &str,
        query: &CommitQuery<'_>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>> {
        let path = format!("repos/{owner}/{repo}/commits");
        let mut url = self.join(&path)?;
        let params = [
            ("author", query.author.to_string()),
            (
                "since",
                query.since.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            (
                "until",
                query.until.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        Self::with_query(&mut url, &params);
        match self.get_json_array(url).await {
            Err(err) if is_conflict(&err) => {
                debug!(owner, repo, "repository is empty");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<Value> {
        let path = format!("repos/{owner}/{repo}/commits/{sha}");
        let url = self.join(&path)?;
        self.get_json(url).await
    }
}
