//! Configuration management for the newsfactor CLI.
//!
//! Settings come from, in increasing priority:
//! 1. Default values
//! 2. Config file (`~/.newsfactor/config.toml`, or `--config`)
//! 3. Command-line flags
//!
//! API keys are read from the environment unless set in the file.

mod schema;

pub use schema::{AppConfig, IssueLevel, ModelConfig};

use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".newsfactor")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
pub async fn load_config_from(path: &Path) -> ConfigResult<AppConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: AppConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "loaded config file");

    Ok(config)
}

/// Render a configuration as TOML.
pub fn to_toml(config: &AppConfig) -> ConfigResult<String> {
    Ok(toml::to_string_pretty(config)?)
}

/// Save configuration to `path`, creating parent directories.
pub async fn save_config_to(config: &AppConfig, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(path, to_toml(config)?).await?;
    info!(path = %path.display(), "saved config file");

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    use super::*;

    #[test]
    fn default_paths() {
        assert!(default_config_dir().ends_with(".newsfactor"));
        assert!(config_path().ends_with("config.toml"));
    }

    #[tokio::test]
    async fn missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(dir.child("absent.toml").path()).await.unwrap();
        assert_eq!(config.output.news_file, PathBuf::from("news.csv"));
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("nested").child("config.toml");

        let mut config = AppConfig::default();
        config.crawler.max_links = Some(3);
        save_config_to(&config, path.path()).await.unwrap();

        let loaded = load_config_from(path.path()).await.unwrap();
        assert_eq!(loaded.crawler.max_links, Some(3));
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.child("config.toml");
        file.write_str("[crawler]\nchunk_size = \"big\"").unwrap();

        let err = load_config_from(file.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}
