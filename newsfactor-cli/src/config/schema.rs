//! Configuration schema definitions.

use std::path::PathBuf;

use newsfactor::news::{DEFAULT_NEWS_URL, HeaderStyle};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Chat models per task.
    #[serde(default)]
    pub providers: ProviderConfig,

    /// Fetching and extraction settings.
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Output files.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which model serves which task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Model used to extract links and records from pages.
    #[serde(default = "default_extraction_model")]
    pub extraction: ModelConfig,
    /// Model used to score news impact.
    #[serde(default = "default_chat_model")]
    pub analysis: ModelConfig,
    /// Model behind the assistant, chat and drafter sessions.
    #[serde(default = "default_chat_model")]
    pub chat: ModelConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            extraction: default_extraction_model(),
            analysis: default_chat_model(),
            chat: default_chat_model(),
        }
    }
}

fn default_extraction_model() -> ModelConfig {
    ModelConfig::new("deepseek/deepseek-chat")
}

fn default_chat_model() -> ModelConfig {
    ModelConfig::new("dashscope/qwen-plus")
}

/// One model endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// `provider/model`, e.g. `deepseek/deepseek-chat`.
    pub model: String,
    /// API key; the provider's environment variable is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ModelConfig {
    /// Model config with no overrides.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            api_base: None,
            temperature: None,
        }
    }
}

/// Fetching and extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Listing page used when none is given.
    pub default_url: String,
    /// Page fetch timeout.
    pub timeout_secs: u64,
    /// Cap on page markdown, in characters.
    pub max_output_length: usize,
    /// Extraction chunk size, in characters.
    pub chunk_size: usize,
    /// Keep only article links containing this marker.
    pub link_filter: Option<String>,
    /// Drop records missing any field.
    pub strict: bool,
    /// Process at most this many article links.
    pub max_links: Option<usize>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            default_url: DEFAULT_NEWS_URL.to_owned(),
            timeout_secs: 30,
            max_output_length: 100_000,
            chunk_size: 6_000,
            link_filter: None,
            strict: false,
            max_links: None,
        }
    }
}

/// Output files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Raw news snapshot.
    pub news_file: PathBuf,
    /// Scored factor snapshot.
    pub factor_file: PathBuf,
    /// Header row of the news snapshot.
    pub news_header: HeaderStyle,
    /// Header row of the factor snapshot.
    pub factor_header: HeaderStyle,
    /// Chat transcript.
    pub transcript_file: PathBuf,
    /// Where the drafter saves documents.
    pub draft_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            news_file: PathBuf::from("news.csv"),
            factor_file: PathBuf::from("factor.csv"),
            news_header: HeaderStyle::Chinese,
            factor_header: HeaderStyle::Chinese,
            transcript_file: PathBuf::from("logger.txt"),
            draft_dir: None,
        }
    }
}

/// Severity of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Will fail at runtime.
    Error,
    /// Probably unintended.
    Warning,
}

/// A problem found by [`AppConfig::validate`].
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    /// Issue severity level.
    pub level: IssueLevel,
    /// Configuration path (e.g., "crawler.chunk_size").
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl ConfigIssue {
    fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl AppConfig {
    /// Check the configuration for problems.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (path, model) in [
            ("providers.extraction", &self.providers.extraction),
            ("providers.analysis", &self.providers.analysis),
            ("providers.chat", &self.providers.chat),
        ] {
            if let Err(e) = model.model.parse::<newsfactor::llms::ModelSpec>() {
                issues.push(ConfigIssue::error(format!("{path}.model"), e.to_string()));
            }
        }

        if self.crawler.chunk_size == 0 {
            issues.push(ConfigIssue::error(
                "crawler.chunk_size",
                "Chunk size must be at least 1",
            ));
        }
        if self.crawler.timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                "crawler.timeout_secs",
                "Timeout is 0, every fetch will fail",
            ));
        }
        if !self.crawler.default_url.starts_with("http") {
            issues.push(ConfigIssue::warning(
                "crawler.default_url",
                "Default URL is not an http(s) link",
            ));
        }

        issues
    }

    /// Check if the configuration has no errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.level != IssueLevel::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.providers.extraction.model, "deepseek/deepseek-chat");
        assert_eq!(config.providers.analysis.model, "dashscope/qwen-plus");
        assert_eq!(config.crawler.default_url, DEFAULT_NEWS_URL);
        assert_eq!(config.output.factor_file, PathBuf::from("factor.csv"));
        assert!(config.is_valid());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [providers.chat]
            model = "openai/gpt-4o-mini"
            temperature = 0.3

            [crawler]
            link_filter = "/a/"
            max_links = 5

            [output]
            factor_header = "chinese_short"
            "#,
        )
        .unwrap();

        assert_eq!(config.providers.chat.model, "openai/gpt-4o-mini");
        assert_eq!(config.providers.chat.temperature, Some(0.3));
        assert_eq!(config.providers.extraction.model, "deepseek/deepseek-chat");
        assert_eq!(config.crawler.link_filter.as_deref(), Some("/a/"));
        assert_eq!(config.crawler.chunk_size, 6_000);
        assert_eq!(config.output.factor_header, HeaderStyle::ChineseShort);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<AppConfig>("[wallet]\nchain = 1").is_err());
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut config = AppConfig::default();
        config.providers.analysis.model = "mystery/model".to_owned();
        config.crawler.chunk_size = 0;

        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.level == IssueLevel::Error));
        assert!(!config.is_valid());
    }
}
