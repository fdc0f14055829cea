//! Choosing the listing page to crawl.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::chat::{ChatProvider, ChatRequest};

/// Listing page used when nothing better is known.
pub const DEFAULT_NEWS_URL: &str = "https://kuaixun.eastmoney.com/ssgs.html";

/// Known listing pages and what they cover.
pub const NEWS_SOURCES: [(&str, &str); 4] = [
    (DEFAULT_NEWS_URL, "东方财富上市公司快讯"),
    ("https://finance.eastmoney.com/news.html", "东方财富财经新闻"),
    ("https://www.cls.cn/telegraph", "财联社电报"),
    ("https://www.yicai.com/news/company", "第一财经公司新闻"),
];

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:https?://|www\.)[^\s<>"，。！？；：、（）【】《》「」]+"#).expect("valid regex")
});

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '\'', '*', '`'];

/// Use `query` when it is already a URL, otherwise the default listing page.
#[must_use]
pub fn select_url(query: &str) -> String {
    let query = query.trim();
    if query.starts_with("http") {
        query.to_owned()
    } else {
        DEFAULT_NEWS_URL.to_owned()
    }
}

/// Every `http(s)://` or `www.` link in free text, in order of appearance.
///
/// Links end at whitespace, quotes, angle brackets or full-width
/// punctuation, so non-ASCII paths are kept whole. Trailing ASCII
/// punctuation is trimmed.
#[must_use]
pub fn find_urls(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION))
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Asks a chat model to pick one of [`NEWS_SOURCES`] for a user request.
#[derive(Clone)]
pub struct UrlRecommender {
    provider: Arc<dyn ChatProvider>,
}

impl std::fmt::Debug for UrlRecommender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlRecommender")
            .field("provider", &self.provider.provider_name())
            .finish()
    }
}

impl UrlRecommender {
    /// Create a recommender using the provider's default model.
    #[must_use]
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
        }
    }

    fn prompt(query: &str) -> String {
        let catalogue: String = NEWS_SOURCES
            .iter()
            .enumerate()
            .map(|(i, (url, label))| format!("{}. {url} ({label})\n", i + 1))
            .collect();
        format!(
            "作为专业的金融新闻助手，请根据用户需求推荐一个合适的新闻网页URL。\n\n\
             用户需求：{query}\n\n\
             请从以下选项中选择最合适的URL：\n{catalogue}\n\
             请直接返回选择的URL，不要包含任何其他内容。"
        )
    }

    /// Recommend a listing page for `query`.
    ///
    /// A query that already is a URL is returned unchanged. Model failures
    /// and replies that do not start with `http` fall back to
    /// [`DEFAULT_NEWS_URL`].
    pub async fn recommend(&self, query: &str) -> String {
        if query.trim().starts_with("http") {
            return select_url(query);
        }

        let request = ChatRequest::default()
            .user(Self::prompt(query))
            .temperature(0.0);

        match self.provider.chat(&request).await {
            Ok(response) => {
                let reply = response.text().unwrap_or_default().trim();
                if reply.starts_with("http") {
                    let url = find_urls(reply)
                        .into_iter()
                        .next()
                        .unwrap_or_else(|| reply.to_owned());
                    debug!(%url, "Model recommended URL");
                    url
                } else {
                    warn!(reply, "Model reply is not a URL, using default");
                    DEFAULT_NEWS_URL.to_owned()
                }
            }
            Err(e) => {
                warn!(error = %e, "URL recommendation failed, using default");
                DEFAULT_NEWS_URL.to_owned()
            }
        }
    }
}
