//! Error types for the hub adapters.

use std::path::PathBuf;

use hubident_resolver::ResolveError;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type HookResult<T> = Result<T, HookError>;

/// Errors loading or validating the platform config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Reasons a session start is aborted.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("user {0} is not allowed to start a session")]
    Rejected(String),

    #[error("user {0} not found in directory")]
    NotFound(String),

    #[error("identity resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("hook misconfigured: {0}")]
    Config(String),
}
