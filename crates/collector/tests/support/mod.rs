#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use collector::{CommitQuery, GithubClient};
use serde_json::{json, Value};

pub struct StubCommit {
    pub sha: &'static str,
    pub date: &'static str,
    pub files: &'static [&'static str],
}

/// In-memory GitHub: repositories, commits per `owner/name`, and a set of
/// repositories whose commit listing fails.
#[derive(Default)]
pub struct StubGithub {
    repos: Vec<Value>,
    commits: HashMap<String, Vec<StubCommit>>,
    failing: HashSet<String>,
    pub listed: Mutex<Vec<String>>,
    pub repo_pages: Mutex<Vec<u32>>,
}

impl StubGithub {
    pub fn repo(self, name: &str, pushed_at: &str, commits: Vec<StubCommit>) -> Self {
        self.owned_repo("octocat", name, pushed_at, commits)
    }

    pub fn owned_repo(
        mut self,
        owner: &str,
        name: &str,
        pushed_at: &str,
        commits: Vec<StubCommit>,
    ) -> Self {
        let full_name = format!("{owner}/{name}");
        self.repos.push(json!({
            "name": name,
            "full_name": full_name,
            "owner": { "login": owner },
            "pushed_at": pushed_at,
        }));
        self.commits.insert(full_name, commits);
        self
    }

    pub fn failing_repo(mut self, name: &str, pushed_at: &str) -> Self {
        self = self.repo(name, pushed_at, Vec::new());
        self.failing.insert(name.to_string());
        self
    }

    fn commit_date(commit: &StubCommit) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(commit.date)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn page<T: Clone>(items: &[T], page: u32, per_page: u32) -> Vec<T> {
        items
            .iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl GithubClient for StubGithub {
    async fn list_user_repos(&self, page: u32, per_page: u32) -> Result<Vec<Value>> {
        self.repo_pages.lock().unwrap().push(page);
        Ok(Self::page(&self.repos, page, per_page))
    }

    async fn list_repo_commits(
        &self,
        owner: &str,
        repo: &str,
        query: &CommitQuery<'_>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>> {
        self.listed.lock().unwrap().push(repo.to_string());
        if self.failing.contains(repo) {
            return Err(anyhow!("github api error: 502 for repos/octocat/{repo}/commits"));
        }
        assert_eq!(query.author, "octocat");
        let summaries: Vec<Value> = self
            .commits
            .get(&format!("{owner}/{repo}"))
            .map(|commits| {
                commits
                    .iter()
                    .filter(|c| {
                        let at = Self::commit_date(c);
                        at >= query.since && at < query.until
                    })
                    .map(|c| json!({ "sha": c.sha, "commit": { "message": "work" } }))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self::page(&summaries, page, per_page))
    }

    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<Value> {
        let commit = self
            .commits
            .get(&format!("{owner}/{repo}"))
            .and_then(|commits| commits.iter().find(|c| c.sha == sha))
            .ok_or_else(|| anyhow!("unknown commit {sha}"))?;
        let files: Vec<Value> = commit
            .files
            .iter()
            .map(|f| json!({ "filename": f, "status": "modified" }))
            .collect();
        Ok(json!({
            "sha": commit.sha,
            "commit": {
                "author": { "name": "Octo", "date": commit.date },
                "message": "work"
            },
            "files": files,
        }))
    }
}

/// Two weeks of activity around Saturday 2026-02-14 (JST).
pub fn two_week_github() -> StubGithub {
    StubGithub::default()
        .repo(
            "alpha",
            "2026-02-12T00:00:00Z",
            vec![
                StubCommit {
                    sha: "a1",
                    date: "2026-02-09T03:15:00Z",
                    files: &["cmd/main.go"],
                },
                StubCommit {
                    sha: "a2",
                    date: "2026-02-02T10:00:00Z",
                    files: &["src/lib.rs"],
                },
            ],
        )
        .repo(
            "beta",
            "2026-02-12T15:00:00Z",
            vec![StubCommit {
                sha: "b1",
                date: "2026-02-12T14:30:00Z",
                files: &["web/app.ts"],
            }],
        )
        .repo(
            "obsidian-vault",
            "2026-02-13T00:00:00Z",
            vec![StubCommit {
                sha: "o1",
                date: "2026-02-10T00:00:00Z",
                files: &["notes/today.md"],
            }],
        )
        .failing_repo("broken", "2026-02-10T00:00:00Z")
        .repo(
            "stale",
            "2025-01-01T00:00:00Z",
            vec![StubCommit {
                sha: "s1",
                date: "2026-02-10T00:00:00Z",
                files: &["old.go"],
            }],
        )
}
