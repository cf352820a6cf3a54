use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while assembling a walker boundary.
///
/// Path queries never produce these; a missing path is reported through
/// [`crate::PathOutcome`] instead.
#[derive(Debug, Error)]
pub enum WalkerError {
    #[error("mask dimensions must be non-zero (got {width}x{height})")]
    EmptyMask { width: u32, height: u32 },
    #[error("mask data length mismatch: {width}x{height} needs {expected} bytes but got {actual}")]
    MaskLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("mask row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid walker boundary config: {0}")]
    InvalidConfig(String),
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WalkerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WalkerError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = WalkerError> = std::result::Result<T, E>;
