use std::path::{Path, PathBuf};

use analysis::WeeklyComparison;
use tracing::info;

use crate::error::NotifyError;

pub fn document_name(comparison: &WeeklyComparison) -> String {
    format!("{}.json", comparison.current.end_date.format("%Y-%m-%d"))
}

/// Writes the comparison as pretty JSON to `<dir>/<end_date>.json`,
/// creating `dir` if needed. An existing file for the same week is replaced.
pub async fn write_json(dir: &Path, comparison: &WeeklyComparison) -> Result<PathBuf, NotifyError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|err| NotifyError::io(dir, err))?;

    let path = dir.join(document_name(comparison));
    let body = serde_json::to_vec_pretty(comparison)?;
    tokio::fs::write(&path, body)
        .await
        .map_err(|err| NotifyError::io(&path, err))?;
    info!(path = %path.display(), "wrote weekly report document");
    Ok(path)
}
