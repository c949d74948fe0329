//! Error types for ability metadata loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors during ability definition loading
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read ability file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse ability TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read ability directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid ability {meta_id} in {path}: {reason}")]
    InvalidDefinition {
        path: PathBuf,
        meta_id: i32,
        reason: String,
    },
}
