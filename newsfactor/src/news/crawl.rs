//! Two-level news crawl: listing page to article links, then each article
//! to news records.

use std::path::PathBuf;

use tracing::{info, warn};

use super::content::{CONTENT_INSTRUCTION, records_from_content};
use super::links::{DEFAULT_ARTICLE_FILTER, LINK_INSTRUCTION, collect_links};
use super::persist::{HeaderStyle, save_records};
use super::record::{NewsContent, NewsRecord, NewsUrl};
use crate::crawler::{ExtractionStrategy, WebCrawler};

/// Tuning for a [`NewsCrawler`].
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Keep only article links containing this marker.
    pub link_filter: Option<String>,
    /// Drop records missing any field.
    pub strict: bool,
    /// Process at most this many links.
    pub max_links: Option<usize>,
    /// Where to save the raw news snapshot; `None` disables it.
    pub news_output: Option<PathBuf>,
    /// Header layout of the raw news snapshot.
    pub news_header: HeaderStyle,
    /// Extraction chunk size in characters.
    pub chunk_size: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            link_filter: None,
            strict: false,
            max_links: None,
            news_output: Some(PathBuf::from("news.csv")),
            news_header: HeaderStyle::Chinese,
            chunk_size: ExtractionStrategy::DEFAULT_CHUNK_SIZE,
        }
    }
}

impl CrawlOptions {
    /// Keep only links on the default site's article path.
    #[must_use]
    pub fn with_article_filter(mut self) -> Self {
        self.link_filter = Some(DEFAULT_ARTICLE_FILTER.to_owned());
        self
    }
}

/// Crawls a listing page and every article it links to.
#[derive(Debug, Clone)]
pub struct NewsCrawler {
    crawler: WebCrawler,
    options: CrawlOptions,
    link_strategy: ExtractionStrategy,
    content_strategy: ExtractionStrategy,
}

impl NewsCrawler {
    /// Create a news crawler.
    #[must_use]
    pub fn new(crawler: WebCrawler, options: CrawlOptions) -> Self {
        let link_strategy = ExtractionStrategy::for_type::<NewsUrl>(LINK_INSTRUCTION)
            .with_chunk_size(options.chunk_size);
        let content_strategy = ExtractionStrategy::for_type::<NewsContent>(CONTENT_INSTRUCTION)
            .with_chunk_size(options.chunk_size);
        Self {
            crawler,
            options,
            link_strategy,
            content_strategy,
        }
    }

    /// Options in effect.
    #[must_use]
    pub const fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Article links on `url`, in page order. Empty on any failure.
    pub async fn extract_links(&self, url: &str) -> Vec<String> {
        let result = self.crawler.run(url, &self.link_strategy).await;
        if !result.success {
            warn!(
                url,
                error = result.error_message.as_deref().unwrap_or("unknown"),
                "Link extraction failed"
            );
            return Vec::new();
        }
        if !matches!(result.extracted_content, Some(serde_json::Value::Array(_))) {
            warn!(url, "Link extraction returned no list");
            return Vec::new();
        }
        collect_links(result.items(), self.options.link_filter.as_deref())
    }

    /// News records on one article page, or `None` when extraction failed.
    pub async fn extract_content(&self, url: &str) -> Option<Vec<NewsRecord>> {
        let result = self.crawler.run(url, &self.content_strategy).await;
        if !result.success {
            return None;
        }
        records_from_content(result.extracted_content.as_ref()?, self.options.strict)
    }

    /// Crawl `url` and every article it links to, strictly sequentially.
    ///
    /// Saves the raw news snapshot when at least one record was extracted.
    pub async fn crawl(&self, url: &str) -> Vec<NewsRecord> {
        let mut links = self.extract_links(url).await;
        let total_links = links.len();
        if links.is_empty() {
            warn!(url, "No news links found");
            return Vec::new();
        }
        info!(url, total_links, "Found news links");

        if let Some(max) = self.options.max_links {
            links.truncate(max);
        }

        let mut all_news = Vec::new();
        for (i, link) in links.iter().enumerate() {
            info!(index = i + 1, total = links.len(), url = %link, "Processing article");
            match self.extract_content(link).await {
                Some(records) => {
                    info!(url = %link, records = records.len(), "Extraction succeeded");
                    all_news.extend(records);
                }
                None => warn!(url = %link, "Extraction failed"),
            }
        }

        info!(
            total_links,
            processed = links.len(),
            records = all_news.len(),
            "News crawl finished"
        );

        if let Some(path) = &self.options.news_output
            && !all_news.is_empty()
        {
            let status = save_records(&all_news, path, self.options.news_header);
            info!(%status, "Raw news snapshot");
        }

        all_news
    }
}
