//! Provider presets and `provider/model` strings.

use std::fmt;
use std::str::FromStr;

use crate::error::LlmError;

/// A known OpenAI-compatible vendor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// DeepSeek (`https://api.deepseek.com/v1`).
    #[default]
    DeepSeek,
    /// Alibaba DashScope compatible mode, also known as Tongyi / Qwen.
    DashScope,
    /// OpenAI itself.
    OpenAI,
}

impl ProviderKind {
    /// Short name used in logs, errors and config files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::DashScope => "dashscope",
            Self::OpenAI => "openai",
        }
    }

    /// Environment variable holding the API key.
    #[must_use]
    pub const fn api_key_env(&self) -> &'static str {
        match self {
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::DashScope => "DASHSCOPE_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
        }
    }

    /// Default API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &'static str {
        match self {
            Self::DeepSeek => "https://api.deepseek.com/v1",
            Self::DashScope => "https://dashscope.aliyuncs.com/compatible-mode/v1",
            Self::OpenAI => "https://api.openai.com/v1",
        }
    }

    /// Default model name.
    #[must_use]
    pub const fn default_model(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek-chat",
            Self::DashScope => "qwen-plus",
            Self::OpenAI => "gpt-4o-mini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(Self::DeepSeek),
            "dashscope" | "tongyi" | "qwen" => Ok(Self::DashScope),
            "openai" => Ok(Self::OpenAI),
            other => Err(LlmError::UnknownProvider(other.to_owned())),
        }
    }
}

/// A provider together with a model name, written as `provider/model`.
///
/// A bare provider name (`"deepseek"`) selects that provider's default model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Vendor preset.
    pub provider: ProviderKind,
    /// Model name passed to the API.
    pub model: String,
}

impl ModelSpec {
    /// Creates a spec for `provider` with its default model.
    #[must_use]
    pub fn default_for(provider: ProviderKind) -> Self {
        Self {
            provider,
            model: provider.default_model().to_owned(),
        }
    }
}

impl FromStr for ModelSpec {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((provider, model)) if !model.trim().is_empty() => Ok(Self {
                provider: provider.parse()?,
                model: model.trim().to_owned(),
            }),
            Some((provider, _)) => Ok(Self::default_for(provider.parse()?)),
            None => Ok(Self::default_for(s.parse()?)),
        }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}
