//! Unified error types for newsfactor.
//!
//! This module provides the error hierarchy shared by every stage:
//! - LLM provider errors (authentication, rate limiting, bad replies)
//! - Crawl errors (fetching and extracting pages)
//! - Tool execution errors (drafter tools)
//! - Graph errors (compiling and running a workflow)

use crate::graph::GraphError;

/// Result type alias for newsfactor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for newsfactor.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// LLM provider error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Crawling or page extraction error.
    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    /// Tool execution error.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Workflow graph error.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// A model reply could not be turned into an analysis.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an analysis error with a message.
    #[must_use]
    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis(msg.into())
    }
}

/// Error type for LLM provider operations.
///
/// Each variant represents a distinct failure mode so callers can match on
/// specific cases.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum LlmError {
    /// Authentication or authorization failure.
    #[error("[{provider}] {message}")]
    Auth {
        /// Provider name (e.g., "deepseek", "dashscope").
        provider: String,
        /// Error description.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("[{provider}] Rate limit exceeded. Please retry after some time.")]
    RateLimited {
        /// Provider name.
        provider: String,
    },

    /// Response format error.
    #[error("Expected {expected}, got {got}")]
    ResponseFormat {
        /// Expected format description.
        expected: String,
        /// Actual format received.
        got: String,
    },

    /// Network or connection error.
    #[error("{0}")]
    Network(String),

    /// HTTP status error.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Provider-specific error.
    #[error("[{provider}] {message}")]
    Provider {
        /// Provider name.
        provider: String,
        /// Error description.
        message: String,
        /// Optional error code from the provider.
        code: Option<String>,
    },

    /// Unknown provider name in a model string.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Internal error.
    #[error("{0}")]
    Internal(String),
}

impl LlmError {
    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Auth {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
        }
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::ResponseFormat {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a provider error with an error code.
    #[must_use]
    pub fn provider_code(
        provider: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Llm(err.into())
    }
}

/// Error type for fetching and extracting pages.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum CrawlError {
    /// The URL is not an absolute http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The page answered with a non-success status.
    #[error("HTTP {status} while fetching {url}")]
    HttpStatus {
        /// The requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Transport failure while fetching a page.
    #[error("Error fetching page: {0}")]
    Fetch(String),

    /// The extraction model produced nothing usable.
    #[error("Extraction failed: {0}")]
    Extraction(String),
}

impl CrawlError {
    /// Create a fetch error.
    #[must_use]
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    /// Create an extraction error.
    #[must_use]
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }
}

/// Error type for tool execution.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ToolError {
    /// Error during tool execution.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Invalid arguments provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool not found.
    #[error("Tool not found: {0}")]
    NotFound(String),
}

impl ToolError {
    /// Create an execution error.
    #[must_use]
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create an invalid arguments error.
    #[must_use]
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_error_display_includes_provider() {
        let err = LlmError::auth("deepseek", "DEEPSEEK_API_KEY environment variable not set");
        assert_eq!(
            err.to_string(),
            "[deepseek] DEEPSEEK_API_KEY environment variable not set"
        );
    }

    #[test]
    fn errors_convert_into_top_level() {
        let err: Error = CrawlError::HttpStatus {
            url: "https://example.com".into(),
            status: 404,
        }
        .into();
        assert!(matches!(err, Error::Crawl(_)));
        assert_eq!(
            err.to_string(),
            "Crawl error: HTTP 404 while fetching https://example.com"
        );

        let err: Error = ToolError::NotFound("publish".into()).into();
        assert_eq!(err.to_string(), "Tool error: Tool not found: publish");
    }
}
