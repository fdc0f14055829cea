//! The news pipeline stages.
//!
//! - [`url_select`]: choose the listing page
//! - [`NewsCrawler`]: listing page to article links to [`NewsRecord`]s
//! - [`ImpactAnalyzer`]: [`NewsRecord`] to [`ImpactRecord`]
//! - [`persist`]: CSV snapshots

mod content;
mod crawl;
mod impact;
mod links;
pub mod persist;
mod record;
pub mod url_select;

pub use content::{CONTENT_INSTRUCTION, records_from_content};
pub use crawl::{CrawlOptions, NewsCrawler};
pub use impact::{ImpactAnalyzer, build_prompt, extract_json_object, normalize_signs, parse_analysis};
pub use links::{DEFAULT_ARTICLE_FILTER, LINK_INSTRUCTION, collect_links, normalize_link};
pub use persist::{CsvRow, HeaderStyle, save_records, write_records};
pub use record::{ImpactAnalysis, ImpactLabel, ImpactRecord, NewsContent, NewsRecord, NewsUrl};
pub use url_select::{DEFAULT_NEWS_URL, NEWS_SOURCES, UrlRecommender, find_urls, select_url};
