use std::io;
use std::net::AddrParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("default provider '{provider}' not found in configured providers")]
    ProviderNotFound { provider: String },

    #[error("provider '{provider}' is missing required field 'endpoint'")]
    MissingEndpoint { provider: String },

    #[error("agent.recursion_limit must be at least 1")]
    InvalidRecursionLimit,

    #[error("invalid server bind address '{value}': {source}")]
    InvalidBind {
        value: String,
        #[source]
        source: AddrParseError,
    },

    #[error("checkpoint backend '{backend}' requires a 'path'")]
    MissingCheckpointPath { backend: String },

    #[error("unknown checkpoint backend '{backend}' (expected memory, file or sqlite)")]
    UnknownCheckpointBackend { backend: String },

    #[error("could not expand path '{value}': {reason}")]
    InvalidPath { value: String, reason: String },
}
