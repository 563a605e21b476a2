//! Pipeline error types

use thiserror::Error;

/// Faults that end a run
///
/// The `Display` text is what ends up in the failed record's `message`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An external command exited nonzero or could not be started
    #[error("{message}")]
    StageFailed { command: String, message: String },

    /// A stage that should have created a run group did not
    #[error("{0}")]
    DiscoveryFailed(String),

    #[error("Failed to read competition set {path}: {source}")]
    CompetitionSet {
        path: String,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize grades: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
