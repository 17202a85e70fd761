use analysis::RawCommit;
use tracing::debug;

use crate::models::NormalizedRepository;
use crate::payloads::{CommitDetailPayload, RepoPayload};

pub fn normalize_repo(payload: &RepoPayload) -> NormalizedRepository {
    NormalizedRepository {
        owner: payload.owner.login.clone(),
        name: payload.name.clone(),
        full_name: payload.full_name.clone(),
        pushed_at: payload.pushed_at,
    }
}

/// Reduces a commit detail to the fields the aggregator reads. A missing or
/// unparseable author date is kept as `None`.
pub fn normalize_commit(repository: &str, payload: &CommitDetailPayload) -> RawCommit {
    let authored_at = payload.commit.author.as_ref().and_then(|a| a.date);
    if authored_at.is_none() {
        debug!(repo = %repository, sha = %payload.sha, "commit has no usable author date");
    }
    RawCommit {
        repository: repository.to_string(),
        sha: payload.sha.clone(),
        authored_at,
        files: payload.files.iter().map(|f| f.filename.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::payloads::{CommitAuthorPayload, CommitFilePayload, CommitInfoPayload, OwnerRef};

    fn file(name: &str) -> CommitFilePayload {
        CommitFilePayload {
            filename: name.into(),
        }
    }

    #[test]
    fn commit_keeps_repo_sha_date_and_files() {
        let date = Utc.with_ymd_and_hms(2026, 2, 9, 3, 0, 0).unwrap();
        let payload = CommitDetailPayload {
            sha: "abc".into(),
            commit: CommitInfoPayload {
                author: Some(CommitAuthorPayload { date: Some(date) }),
            },
            files: vec![file("main.go"), file("go.sum")],
        };
        let raw = normalize_commit("api", &payload);
        assert_eq!(raw.repository, "api");
        assert_eq!(raw.sha, "abc");
        assert_eq!(raw.authored_at, Some(date));
        assert_eq!(raw.files, ["main.go", "go.sum"]);
    }

    #[test]
    fn commit_without_author_has_no_date() {
        let payload = CommitDetailPayload {
            sha: "abc".into(),
            commit: CommitInfoPayload { author: None },
            files: Vec::new(),
        };
        assert!(normalize_commit("api", &payload).authored_at.is_none());
    }

    #[test]
    fn repo_uses_owner_login_and_push_time() {
        let payload = RepoPayload {
            name: "api".into(),
            full_name: "octo/api".into(),
            owner: OwnerRef {
                login: "octo".into(),
            },
            pushed_at: Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()),
        };
        let repo = normalize_repo(&payload);
        assert_eq!(repo.owner, "octo");
        assert_eq!(repo.full_name, "octo/api");
        assert!(repo.pushed_since(Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap()));
        assert!(!repo.pushed_since(Utc.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap()));
    }
}
