//! Error types

use std::path::PathBuf;

/// Failure while fetching or decoding a sprite
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: image::ImageError,
    },
    #[error("unknown sprite: {0}")]
    Unknown(String),
}

/// Malformed collision worker payload
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("obstacle position buffer has odd length {0}")]
    OddLength(usize),
    #[error("malformed worker message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure while reading the game configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
