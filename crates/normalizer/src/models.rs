use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository the report owner can see, reduced to what the fetcher needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedRepository {
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub pushed_at: Option<DateTime<Utc>>,
}

impl NormalizedRepository {
    /// `true` when the repository may hold commits at or after `since`.
    /// Repositories with no push timestamp are kept.
    pub fn pushed_since(&self, since: DateTime<Utc>) -> bool {
        self.pushed_at.map_or(true, |pushed| pushed >= since)
    }
}
