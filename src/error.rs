//! Failure taxonomy shared by every workflow component.
//!
//! Each variant aborts the run; nothing is retried or downgraded to a warning.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The host operating system or architecture has no published rcodesign build.
    #[error("{0}")]
    UnsupportedPlatform(String),

    /// Fetching or unpacking the rcodesign release archive failed.
    #[error("failed to acquire rcodesign from {url}: {reason}")]
    Download { url: String, reason: String },

    /// Inputs are missing or contradictory; raised before any process starts.
    #[error("{0}")]
    Configuration(String),

    /// rcodesign could not be launched or exited unsuccessfully.
    #[error("{stage} failed: the process '{program}' {reason}")]
    Process {
        stage: String,
        program: String,
        reason: String,
    },
}

impl WorkflowError {
    pub(crate) fn download(url: &str, err: impl std::fmt::Display) -> Self {
        WorkflowError::Download {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}
