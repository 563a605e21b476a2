//! Competition Service
//!
//! Lists the competitions known to the benchmark checkout.

use std::path::Path;

/// Competition ids: subdirectories of `competitions_dir` holding a `config.yaml`
///
/// A missing directory yields an empty list.
pub fn list_competition_ids(competitions_dir: &Path) -> std::io::Result<Vec<String>> {
    if !competitions_dir.is_dir() {
        tracing::warn!(
            "Competitions directory {} does not exist",
            competitions_dir.display()
        );
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    for entry in std::fs::read_dir(competitions_dir)? {
        let entry = entry?;
        if entry.path().join("config.yaml").is_file() {
            ids.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    ids.sort();

    Ok(ids)
}
