//! Error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthError {
    /// Unsupported compression factor or image geometry.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A rate that cannot parameterize a Poisson distribution.
    #[error("invalid poisson rate {value} at index {index}")]
    Domain { index: usize, value: f32 },

    /// A cache file exists but cannot be used as-is.
    #[error("failed to read cache {}: {reason}", .path.display())]
    CacheRead { path: PathBuf, reason: String },

    /// Malformed image source.
    #[error("bad input data at {}:{line}: {reason}", .path.display())]
    Data {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SynthError {
    pub(crate) fn cache_read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SynthError::CacheRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SynthError>;
