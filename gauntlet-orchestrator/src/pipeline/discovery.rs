//! Run-group discovery
//!
//! The agent-execution tool names its output directory after the time it
//! started, so the orchestrator cannot know the name in advance. Instead it
//! lists the runs root before the stage and diffs the listing afterwards.

use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Names of the directories currently under `root`
///
/// A missing or unreadable root yields an empty set.
pub fn snapshot(root: &Path) -> BTreeSet<String> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return BTreeSet::new();
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect()
}

/// The newest directory under `root` that is not in `prior`
///
/// When several appeared, the lexicographically last name wins, which for
/// timestamp-prefixed names is the most recent one.
pub fn discover(root: &Path, prior: &BTreeSet<String>) -> Option<String> {
    let current = snapshot(root);
    let found = current.difference(prior).last().cloned();
    debug!("Discovery under {}: {:?}", root.display(), found);
    found
}
