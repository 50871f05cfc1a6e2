//! Error types for field masking and document loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the request boundary while building a mask.
///
/// Malformed path syntax and unknown field names are never errors; they
/// simply match nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    #[error("cannot supply both `{fields_name}` and `{excludes_name}`")]
    ConflictingMasks {
        fields_name: String,
        excludes_name: String,
    },
}

impl MaskError {
    /// Returns the HTTP status code a web layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            MaskError::ConflictingMasks { .. } => 400,
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            MaskError::ConflictingMasks { .. } => 2,
        }
    }
}

/// Errors while loading a JSON document to mask.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}
