//! OpenAI-compatible client configuration.

use crate::error::{LlmError, Result};
use crate::llms::provider::{ModelSpec, ProviderKind};

/// Configuration for the [`OpenAI`](super::OpenAI) client.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Vendor preset, used for error attribution.
    pub provider: ProviderKind,
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Default model to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl OpenAIConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Creates a configuration for `provider` using its preset URL and model.
    #[must_use]
    pub fn for_provider(provider: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            base_url: provider.base_url().to_owned(),
            model: provider.default_model().to_owned(),
            timeout_secs: Some(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Creates a configuration for a parsed `provider/model` spec, reading
    /// the key from the provider's environment variable.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the variable is unset or empty.
    pub fn from_spec(spec: &ModelSpec) -> Result<Self> {
        Ok(Self::from_env(spec.provider)?.with_model(spec.model.clone()))
    }

    /// Creates configuration for `provider` from environment variables.
    ///
    /// Reads the provider's key variable (e.g. `DEEPSEEK_API_KEY`).
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the variable is unset or empty.
    pub fn from_env(provider: ProviderKind) -> Result<Self> {
        let var = provider.api_key_env();
        let api_key = std::env::var(var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                LlmError::auth(provider.as_str(), format!("{var} environment variable not set"))
            })?;
        Ok(Self::for_provider(provider, api_key))
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self::for_provider(ProviderKind::default(), String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_provider_uses_presets() {
        let config = OpenAIConfig::for_provider(ProviderKind::DashScope, "key");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.base_url, ProviderKind::DashScope.base_url());
        assert_eq!(config.model, "qwen-plus");
        assert_eq!(config.timeout_secs, Some(120));
    }

    #[test]
    fn builder_overrides() {
        let config = OpenAIConfig::for_provider(ProviderKind::DeepSeek, "key")
            .with_base_url("http://localhost:8080/v1/")
            .with_model("deepseek-reasoner")
            .with_timeout(30);

        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "deepseek-reasoner");
        assert_eq!(config.timeout_secs, Some(30));
    }
}
