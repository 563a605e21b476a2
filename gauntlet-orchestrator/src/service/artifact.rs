//! Artifact Service
//!
//! Post-hoc scan of a run group's output tree. Files are bucketed by an
//! ordered rule table; the first matching rule wins and unmatched files are
//! left out of the inventory.

use gauntlet_core::dto::artifact::{ArtifactInventory, ArtifactKind};
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// Facts about one file, as the rules see it
///
/// Name and parent are lower-cased; the extension keeps its case.
struct FileFacts {
    name: String,
    extension: String,
    parent: String,
}

impl FileFacts {
    fn of(path: &Path) -> Self {
        let lower = |s: Option<&std::ffi::OsStr>| {
            s.map(|s| s.to_string_lossy().to_lowercase())
                .unwrap_or_default()
        };
        Self {
            name: lower(path.file_name()),
            extension: path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default(),
            parent: lower(path.parent().and_then(|p| p.file_name())),
        }
    }

    fn name_has(&self, needle: &str) -> bool {
        self.name.contains(needle)
    }
}

struct Rule {
    kind: ArtifactKind,
    matches: fn(&FileFacts) -> bool,
}

const RULES: &[Rule] = &[
    Rule {
        kind: ArtifactKind::Submission,
        matches: |f| f.name_has("submission") && matches!(f.extension.as_str(), "csv" | "jsonl"),
    },
    Rule {
        kind: ArtifactKind::GradingReport,
        matches: |f| f.name_has("grading") && f.extension == "json",
    },
    Rule {
        kind: ArtifactKind::Log,
        matches: |f| f.extension == "log" || (f.name.ends_with(".log") && f.parent != "logs"),
    },
    Rule {
        kind: ArtifactKind::Metadata,
        matches: |f| f.name_has("metadata") && f.extension == "json",
    },
    Rule {
        kind: ArtifactKind::Rollout,
        matches: |f| {
            f.parent == "logs"
                || f.name_has("rollout")
                || f.name_has("trajectory")
                || f.name_has("journal")
        },
    },
    Rule {
        kind: ArtifactKind::Code,
        matches: |f| matches!(f.parent.as_str(), "code" | "best_solution" | "workspaces"),
    },
];

/// Category for a single file, if any rule claims it
pub fn classify(path: &Path) -> Option<ArtifactKind> {
    let facts = FileFacts::of(path);
    RULES
        .iter()
        .find(|rule| (rule.matches)(&facts))
        .map(|rule| rule.kind)
}

/// Classify every file under `group_dir` into `inventory`'s buckets
pub fn inventory(
    mut inventory: ArtifactInventory,
    group_dir: &Path,
    project_root: &Path,
) -> ArtifactInventory {
    for path in files_under(group_dir) {
        if let Some(kind) = classify(&path) {
            inventory
                .bucket_mut(kind)
                .push(relative_to(&path, project_root));
        }
    }

    for rule in RULES {
        let bucket = inventory.bucket_mut(rule.kind);
        bucket.sort();
        bucket.dedup();
    }
    inventory
}

/// Every `*grading*.json` file under `group_dir`, sorted
pub fn grading_reports(group_dir: &Path, project_root: &Path) -> Vec<String> {
    let reports: BTreeSet<String> = files_under(group_dir)
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            name.contains("grading") && name.ends_with(".json")
        })
        .map(|path| relative_to(&path, project_root))
        .collect();
    reports.into_iter().collect()
}

fn files_under(dir: &Path) -> impl Iterator<Item = std::path::PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
}

fn relative_to(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}
