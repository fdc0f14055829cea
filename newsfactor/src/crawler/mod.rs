//! Page fetching and LLM-driven structured extraction.
//!
//! A [`WebCrawler`] fetches a page through a [`PageFetcher`], then runs an
//! [`ExtractionStrategy`] over the markdown with an [`LlmExtractor`].
//! Failures never escape [`WebCrawler::run`]; they are reported on the
//! returned [`CrawlResult`].

mod extraction;
mod fetch;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::Result;

pub use extraction::{ExtractionStrategy, LlmExtractor, chunk_text, parse_items};
pub use fetch::{HttpFetcher, html_to_markdown};

/// Source of page content.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its content as markdown.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Outcome of crawling one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// The crawled URL.
    pub url: String,
    /// Whether both fetch and extraction succeeded.
    pub success: bool,
    /// Page markdown, when the fetch succeeded.
    pub markdown: Option<String>,
    /// Extracted items as a JSON array, when extraction succeeded.
    pub extracted_content: Option<Value>,
    /// Failure description.
    pub error_message: Option<String>,
}

impl CrawlResult {
    fn failed(url: &str, markdown: Option<String>, error: &crate::Error) -> Self {
        Self {
            url: url.to_owned(),
            success: false,
            markdown,
            extracted_content: None,
            error_message: Some(error.to_string()),
        }
    }

    /// Extracted items, or an empty slice when extraction produced nothing
    /// or did not yield an array.
    #[must_use]
    pub fn items(&self) -> &[Value] {
        match &self.extracted_content {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }
}

/// Fetch-then-extract crawler.
#[derive(Clone)]
pub struct WebCrawler {
    fetcher: Arc<dyn PageFetcher>,
    extractor: LlmExtractor,
}

impl std::fmt::Debug for WebCrawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebCrawler")
            .field("extractor", &self.extractor)
            .finish_non_exhaustive()
    }
}

impl WebCrawler {
    /// Create a crawler from a fetcher and an extractor.
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, extractor: LlmExtractor) -> Self {
        Self { fetcher, extractor }
    }

    /// Crawl `url` and extract items according to `strategy`.
    pub async fn run(&self, url: &str, strategy: &ExtractionStrategy) -> CrawlResult {
        let markdown = match self.fetcher.fetch(url).await {
            Ok(markdown) => markdown,
            Err(e) => {
                warn!(url, error = %e, "Fetch failed");
                return CrawlResult::failed(url, None, &e);
            }
        };

        match self.extractor.extract(&markdown, strategy).await {
            Ok(items) => {
                info!(url, schema = %strategy.schema_name, items = items.len(), "Crawled page");
                CrawlResult {
                    url: url.to_owned(),
                    success: true,
                    markdown: Some(markdown),
                    extracted_content: Some(Value::Array(items)),
                    error_message: None,
                }
            }
            Err(e) => {
                warn!(url, error = %e, "Extraction failed");
                CrawlResult::failed(url, Some(markdown), &e)
            }
        }
    }
}
