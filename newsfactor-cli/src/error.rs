//! CLI error type.

use crate::config::ConfigError;

/// Result type alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Library failure.
    #[error(transparent)]
    Newsfactor(#[from] newsfactor::Error),

    /// Terminal I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<newsfactor::LlmError> for CliError {
    fn from(err: newsfactor::LlmError) -> Self {
        Self::Newsfactor(err.into())
    }
}
