pub mod models;
pub mod payloads;
pub mod transform;

pub use models::NormalizedRepository;
pub use payloads::{
    CommitAuthorPayload, CommitDetailPayload, CommitFilePayload, CommitSummaryPayload,
    RepoPayload,
};
pub use transform::{normalize_commit, normalize_repo};
