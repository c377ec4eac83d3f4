use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("invalid particle capacity {0}: capacity must be zero or positive")]
    InvalidCapacity(i64),

    #[error("cannot allocate {capacity} particle slots: {source}")]
    Allocation {
        capacity: usize,
        #[source]
        source: std::collections::TryReserveError,
    },

    #[error("failed to read effect config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML effect config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON effect config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported effect config format {0:?} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
