use std::collections::HashSet;
use std::sync::Arc;

use analysis::RawCommit;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use normalizer::models::NormalizedRepository;
use normalizer::{normalize_commit, normalize_repo, CommitDetailPayload, CommitSummaryPayload, RepoPayload};
use tracing::{debug, info, instrument, warn};

use crate::client::{CommitQuery, GithubClient};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub per_page: u32,
    pub commit_concurrency: usize,
    pub excluded_repositories: HashSet<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            per_page: 100,
            commit_concurrency: 8,
            excluded_repositories: HashSet::from(["obsidian-vault".to_string()]),
        }
    }
}

/// Collects every commit by one author across the repositories visible to
/// the token, with the changed file list of each commit.
pub struct CommitFetcher {
    client: Arc<dyn GithubClient>,
    options: FetchOptions,
}

impl CommitFetcher {
    pub fn new(client: Arc<dyn GithubClient>, options: FetchOptions) -> Self {
        Self { client, options }
    }

    #[instrument(skip(self))]
    pub async fn fetch(
        &self,
        author: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<RawCommit>> {
        let repos = self.candidate_repos(since).await?;
        info!(repos = repos.len(), "scanning repositories for commits");

        let query = CommitQuery {
            author,
            since,
            until,
        };
        let mut commits = Vec::new();
        for repo in &repos {
            match self.fetch_repo_commits(repo, &query).await {
                Ok(mut found) => {
                    debug!(repo = %repo.full_name, commits = found.len(), "fetched repository commits");
                    commits.append(&mut found);
                }
                Err(err) => {
                    warn!(repo = %repo.full_name, error = ?err, "failed to fetch repository commits; skipping");
                }
            }
        }
        info!(commits = commits.len(), "commit fetch finished");
        Ok(commits)
    }

    async fn candidate_repos(&self, since: DateTime<Utc>) -> Result<Vec<NormalizedRepository>> {
        let per_page = self.options.per_page.max(1);
        let mut repos = Vec::new();
        let mut page = 1;
        loop {
            let values = self
                .client
                .list_user_repos(page, per_page)
                .await
                .with_context(|| format!("listing repositories (page {page})"))?;
            let fetched = values.len();
            for value in values {
                let payload: RepoPayload =
                    serde_json::from_value(value).context("decoding repository payload")?;
                let repo = normalize_repo(&payload);
                if self.options.excluded_repositories.contains(&repo.name) {
                    debug!(repo = %repo.full_name, "repository excluded by configuration");
                    continue;
                }
                if !repo.pushed_since(since) {
                    continue;
                }
                repos.push(repo);
            }
            if fetched < per_page as usize {
                break;
            }
            page += 1;
        }
        Ok(repos)
    }

    async fn fetch_repo_commits(
        &self,
        repo: &NormalizedRepository,
        query: &CommitQuery<'_>,
    ) -> Result<Vec<RawCommit>> {
        let per_page = self.options.per_page.max(1);
        let mut shas = Vec::new();
        let mut page = 1;
        loop {
            let values = self
                .client
                .list_repo_commits(&repo.owner, &repo.name, query, page, per_page)
                .await?;
            let fetched = values.len();
            for value in values {
                let summary: CommitSummaryPayload =
                    serde_json::from_value(value).context("decoding commit summary")?;
                shas.push(summary.sha);
            }
            if fetched < per_page as usize {
                break;
            }
            page += 1;
        }

        stream::iter(shas)
            .map(|sha| self.fetch_commit(repo, sha))
            .buffer_unordered(self.options.commit_concurrency.max(1))
            .try_collect()
            .await
    }

    /// Commits are keyed by the short repository name, the label the report
    /// shows. Same-named repositories under different owners share a row.
    async fn fetch_commit(&self, repo: &NormalizedRepository, sha: String) -> Result<RawCommit> {
        let value = self
            .client
            .get_commit(&repo.owner, &repo.name, &sha)
            .await
            .with_context(|| format!("fetching commit {sha}"))?;
        let detail: CommitDetailPayload =
            serde_json::from_value(value).context("decoding commit detail")?;
        Ok(normalize_commit(&repo.name, &detail))
    }
}
