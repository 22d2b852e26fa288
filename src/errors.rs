// src/errors.rs

//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PomwatchError {
    /// The change-notification facility could not be created.
    #[error("Change notification facility unavailable: {0}")]
    PlatformUnavailable(#[source] notify::Error),

    /// A single directory could not be subscribed.
    #[error("Failed to register {path:?} for change notification: {source}")]
    Registration {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// The platform reported an error instead of a notification batch.
    #[error("Waiting for change notifications was interrupted: {0}")]
    WaitInterrupted(#[source] notify::Error),

    #[error("Build invocation failed for {root:?}: {reason}")]
    BuildInvocation { root: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PomwatchError>;
