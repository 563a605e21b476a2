//! File Service
//!
//! Resolves download requests to files strictly under the runs root. Paths
//! are given relative to the project root, as run records report them.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("access denied - path must be within {0}")]
    AccessDenied(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A file ready to be sent to a client
#[derive(Debug)]
pub struct Download {
    pub file_name: String,
    pub contents: Vec<u8>,
}

/// Map a requested path to a file under the runs root
///
/// Escapes are refused before existence is checked, so a path outside the
/// root is denied whether or not it exists.
pub fn resolve(config: &Config, requested: &str) -> Result<PathBuf, FileError> {
    let runs_root = normalize(&config.runs_dir);
    let candidate = normalize(&config.project_root.join(requested));

    if !candidate.starts_with(&runs_root) {
        return Err(denied(config));
    }

    if !candidate.is_file() {
        return Err(FileError::NotFound(requested.to_string()));
    }

    // Symlinks inside the root may still point out of it
    let real = candidate.canonicalize()?;
    if !real.starts_with(config.runs_dir.canonicalize()?) {
        return Err(denied(config));
    }

    Ok(real)
}

/// Resolve and read a requested file
pub async fn read(config: &Config, requested: &str) -> Result<Download, FileError> {
    let path = resolve(config, requested)?;
    let contents = tokio::fs::read(&path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());

    tracing::debug!("Serving {} ({} bytes)", path.display(), contents.len());

    Ok(Download {
        file_name,
        contents,
    })
}

fn denied(config: &Config) -> FileError {
    let root = config
        .runs_dir
        .strip_prefix(&config.project_root)
        .unwrap_or(&config.runs_dir);
    FileError::AccessDenied(format!("{}/", root.display()))
}

/// Lexically resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        let config = Config::new(tmp.path().to_path_buf());
        fs::create_dir_all(config.runs_dir.join("g1")).unwrap();
        fs::write(config.runs_dir.join("g1").join("report.json"), "{}").unwrap();
        fs::write(tmp.path().join("secret.txt"), "nope").unwrap();
        (tmp, config)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
    }

    #[test]
    fn test_resolves_file_under_runs() {
        let (_tmp, config) = fixture();
        let path = resolve(&config, "runs/g1/report.json").unwrap();
        assert!(path.ends_with("runs/g1/report.json"));
    }

    #[test]
    fn test_escape_denied_before_existence_check() {
        let (_tmp, config) = fixture();
        assert!(matches!(
            resolve(&config, "runs/../secret.txt"),
            Err(FileError::AccessDenied(_))
        ));
        assert!(matches!(
            resolve(&config, "runs/../../does-not-exist"),
            Err(FileError::AccessDenied(_))
        ));
        assert!(matches!(
            resolve(&config, "secret.txt"),
            Err(FileError::AccessDenied(_))
        ));
    }

    #[test]
    fn test_missing_or_directory_not_found() {
        let (_tmp, config) = fixture();
        assert!(matches!(
            resolve(&config, "runs/g1/missing.json"),
            Err(FileError::NotFound(_))
        ));
        assert!(matches!(
            resolve(&config, "runs/g1"),
            Err(FileError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_denied() {
        let (tmp, config) = fixture();
        std::os::unix::fs::symlink(
            tmp.path().join("secret.txt"),
            config.runs_dir.join("g1").join("link.txt"),
        )
        .unwrap();
        assert!(matches!(
            resolve(&config, "runs/g1/link.txt"),
            Err(FileError::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_read_returns_name_and_bytes() {
        let (_tmp, config) = fixture();
        let download = read(&config, "runs/g1/report.json").await.unwrap();
        assert_eq!(download.file_name, "report.json");
        assert_eq!(download.contents, b"{}");
    }
}
