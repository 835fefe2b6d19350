//! Error types for the tournament engine

use std::path::PathBuf;

use fencing_core::{EngineError, EventId};
use thiserror::Error;

/// Top-level error for engine, store, configuration and script operations
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A scripted event refers to something that does not exist
    #[error("script error: {0}")]
    Script(String),
}

impl TournamentError {
    /// True when the event was left untouched because the input was rejected
    pub fn is_validation(&self) -> bool {
        matches!(self, TournamentError::Engine(e) if e.is_validation())
    }
}

/// Failures of the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed event record {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown event {0}")]
    UnknownEvent(EventId),

    #[error("event {0} already exists")]
    DuplicateEvent(EventId),
}

/// Failures while loading configuration or scripts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
