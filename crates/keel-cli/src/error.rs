//! Error types for the CLI

use std::path::PathBuf;

/// CLI Result type
pub type Result<T> = std::result::Result<T, Error>;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Keel(#[from] keel_common::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Cluster the failure belongs to, when the manifest got far enough to name one
    pub fn cluster(&self) -> Option<&str> {
        match self {
            Error::Keel(err) => err.cluster(),
            _ => None,
        }
    }

    /// Offending field path of a validation failure
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Keel(err) => err.field(),
            _ => None,
        }
    }
}
