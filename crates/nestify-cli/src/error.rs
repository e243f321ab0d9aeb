//! Error handling for the nestify CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Network resolution error
    #[error("Resolution failed: {0}")]
    Resolve(#[from] nestify_resolve::ResolveError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unreadable network file
    #[error("Invalid input {path}: {reason}")]
    Input {
        /// Offending file
        path: String,
        /// Reason
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error
    #[error("Error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an input error
    pub fn input(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::Input {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}
