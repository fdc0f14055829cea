//! HTTP page fetcher with a regex-based HTML to markdown conversion.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;
use url::Url;

use super::PageFetcher;
use crate::error::{CrawlError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(\n[ \t]*){2,}").expect("valid regex"));

static HTML_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?is)<h1[^>]*>(.*?)</h1>", "\n# $1\n"),
        (r"(?is)<h2[^>]*>(.*?)</h2>", "\n## $1\n"),
        (r"(?is)<h3[^>]*>(.*?)</h3>", "\n### $1\n"),
        (r"(?is)<h4[^>]*>(.*?)</h4>", "\n#### $1\n"),
        (r"(?i)<p(?:\s[^>]*)?>", "\n"),
        (r"(?i)</p>", "\n"),
        (r"(?i)<br\s*/?>", "\n"),
        (r"(?i)<li(?:\s[^>]*)?>", "\n- "),
        (r"(?i)</(div|tr|ul|ol|table|section|article)>", "\n"),
        (
            r#"(?is)<a\s[^>]*href=["']([^"']*)["'][^>]*>(.*?)</a>"#,
            "[$2]($1)",
        ),
        (r"(?is)<(?:strong|b)(?:\s[^>]*)?>(.*?)</(?:strong|b)>", "**$1**"),
        (r"(?is)<(?:em|i)(?:\s[^>]*)?>(.*?)</(?:em|i)>", "*$1*"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid regex"), replacement))
    .collect()
});

/// Fetches pages over HTTP and returns them as markdown.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_output_length: usize,
}

impl HttpFetcher {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default cap on returned markdown, in characters.
    pub const DEFAULT_MAX_OUTPUT_LENGTH: usize = 100_000;

    /// Create a fetcher with default timeout and output cap.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT_SECS)
    }

    /// Create a fetcher with a custom timeout.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn with_timeout(secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CrawlError::fetch(e.to_string()))?;
        Ok(Self {
            client,
            max_output_length: Self::DEFAULT_MAX_OUTPUT_LENGTH,
        })
    }

    /// Set maximum output length in characters.
    #[must_use]
    pub const fn with_max_output_length(mut self, max: usize) -> Self {
        self.max_output_length = max;
        self
    }

    fn truncate(&self, content: String) -> String {
        match content.char_indices().nth(self.max_output_length) {
            None => content,
            Some((cut, _)) => format!(
                "{}...\n\n_Content truncated to {} characters_",
                &content[..cut],
                self.max_output_length
            ),
        }
    }
}

/// Convert HTML to simple markdown.
///
/// Keeps headings, paragraphs, list items, emphasis and links; every other
/// tag is dropped.
#[must_use]
pub fn html_to_markdown(html: &str) -> String {
    let text = SCRIPT_RE.replace_all(html, "");
    let text = STYLE_RE.replace_all(&text, "");
    let mut text = COMMENT_RE.replace_all(&text, "").into_owned();

    for (re, replacement) in HTML_PATTERNS.iter() {
        text = re.replace_all(&text, *replacement).into_owned();
    }

    text = TAG_RE.replace_all(&text, "").into_owned();

    text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    BLANK_LINES_RE
        .replace_all(&text, "\n\n")
        .trim()
        .to_owned()
}

pub(crate) fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| CrawlError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(CrawlError::InvalidUrl(format!("{raw}: URL must use http or https")).into()),
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = parse_http_url(url)?;

        let response = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                CrawlError::fetch("Request timed out")
            } else {
                CrawlError::fetch(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            }
            .into());
        }

        let html = response
            .text()
            .await
            .map_err(|e| CrawlError::fetch(format!("Failed to read response: {e}")))?;
        debug!(url, bytes = html.len(), "Fetched page");

        Ok(self.truncate(html_to_markdown(&html)))
    }
}
