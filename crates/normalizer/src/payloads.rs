use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::{serde_as, DefaultOnError};

#[derive(Debug, Clone, Deserialize)]
pub struct RepoPayload {
    pub name: String,
    pub full_name: String,
    pub owner: OwnerRef,
    pub pushed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerRef {
    pub login: String,
}

/// One entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitSummaryPayload {
    pub sha: String,
    pub commit: CommitInfoPayload,
}

/// `GET /repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetailPayload {
    pub sha: String,
    pub commit: CommitInfoPayload,
    #[serde(default)]
    pub files: Vec<CommitFilePayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfoPayload {
    #[serde(default)]
    pub author: Option<CommitAuthorPayload>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthorPayload {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitFilePayload {
    pub filename: String,
}
