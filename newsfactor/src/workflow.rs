//! The news analysis workflow: `get_url -> crawl -> analyze -> save`.
//!
//! Each node owns one field of [`AgentState`] and overwrites it. The crawl
//! node ends the run early when nothing was extracted.
//!
//! # Example
//!
//! ```rust,ignore
//! use newsfactor::prelude::*;
//!
//! let pipeline = NewsPipeline::new(crawler, analyzer);
//! let state = run_workflow(pipeline, AgentState::default()).await?;
//! println!("{}", state.save_status.unwrap_or_default());
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;
use crate::graph::{CompiledStateGraph, Next, Node, StateGraph};
use crate::message::{Message, Role};
use crate::news::{
    HeaderStyle, ImpactAnalyzer, ImpactRecord, NewsCrawler, NewsRecord, UrlRecommender,
    save_records, select_url,
};

/// State carried through the workflow graph.
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    /// Conversation history.
    pub messages: Vec<Message>,
    /// Listing page to crawl.
    pub url: Option<String>,
    /// Records extracted by the crawl node.
    pub news_data: Vec<NewsRecord>,
    /// Records scored by the analyze node.
    pub factor_data: Vec<ImpactRecord>,
    /// Persister status from the save node.
    pub save_status: Option<String>,
}

impl AgentState {
    /// State with a preset listing page.
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// State seeded with a user request, used to pick the listing page.
    #[must_use]
    pub fn from_query(query: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(query)],
            ..Self::default()
        }
    }

    fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(Message::text)
    }
}

/// Output settings for the factor snapshot.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Where the scored records go.
    pub factor_output: PathBuf,
    /// Header layout of the factor CSV.
    pub factor_header: HeaderStyle,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            factor_output: PathBuf::from("factor.csv"),
            factor_header: HeaderStyle::Chinese,
        }
    }
}

/// Everything the workflow nodes need.
#[derive(Debug, Clone)]
pub struct NewsPipeline {
    crawler: NewsCrawler,
    analyzer: ImpactAnalyzer,
    recommender: Option<UrlRecommender>,
    config: WorkflowConfig,
}

impl NewsPipeline {
    /// Pipeline with the default output settings and no URL recommender.
    #[must_use]
    pub fn new(crawler: NewsCrawler, analyzer: ImpactAnalyzer) -> Self {
        Self {
            crawler,
            analyzer,
            recommender: None,
            config: WorkflowConfig::default(),
        }
    }

    /// Let a model choose the listing page from the user's request.
    #[must_use]
    pub fn with_recommender(mut self, recommender: UrlRecommender) -> Self {
        self.recommender = Some(recommender);
        self
    }

    /// Override the output settings.
    #[must_use]
    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }
}

struct GetUrlNode {
    recommender: Option<UrlRecommender>,
}

#[async_trait]
impl Node<AgentState> for GetUrlNode {
    fn id(&self) -> &str {
        "get_url"
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next)> {
        info!(node = "get_url", "Entering node");
        if state.url.is_none() {
            let query = state.last_user_text().unwrap_or_default().to_owned();
            let url = match &self.recommender {
                Some(recommender) if !query.is_empty() => recommender.recommend(&query).await,
                _ => select_url(&query),
            };
            state.url = Some(url);
        }
        info!(node = "get_url", url = state.url.as_deref().unwrap_or_default(), "Leaving node");
        Ok((state, Next::Continue))
    }
}

struct CrawlNode {
    crawler: NewsCrawler,
}

#[async_trait]
impl Node<AgentState> for CrawlNode {
    fn id(&self) -> &str {
        "crawl"
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next)> {
        info!(node = "crawl", "Entering node");
        let url = state.url.clone().unwrap_or_else(|| select_url(""));
        state.news_data = self.crawler.crawl(&url).await;
        if state.news_data.is_empty() {
            warn!(node = "crawl", %url, "No news extracted, ending run");
            return Ok((state, Next::End));
        }
        info!(node = "crawl", records = state.news_data.len(), "Leaving node");
        Ok((state, Next::Continue))
    }
}

struct AnalyzeNode {
    analyzer: ImpactAnalyzer,
}

#[async_trait]
impl Node<AgentState> for AnalyzeNode {
    fn id(&self) -> &str {
        "analyze"
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next)> {
        info!(node = "analyze", news = state.news_data.len(), "Entering node");
        state.factor_data = self.analyzer.analyze_all(&state.news_data).await;
        info!(node = "analyze", factors = state.factor_data.len(), "Leaving node");
        Ok((state, Next::Continue))
    }
}

struct SaveNode {
    config: WorkflowConfig,
}

#[async_trait]
impl Node<AgentState> for SaveNode {
    fn id(&self) -> &str {
        "save"
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next)> {
        info!(node = "save", "Entering node");
        let status = save_records(
            &state.factor_data,
            &self.config.factor_output,
            self.config.factor_header,
        );
        info!(node = "save", %status, "Leaving node");
        state.messages.push(Message::assistant(status.clone()));
        state.save_status = Some(status);
        Ok((state, Next::End))
    }
}

/// Build the `get_url -> crawl -> analyze -> save` graph.
///
/// # Errors
///
/// Only fails if the graph wiring is inconsistent.
pub fn news_workflow(pipeline: NewsPipeline) -> Result<CompiledStateGraph<AgentState>> {
    let NewsPipeline {
        crawler,
        analyzer,
        recommender,
        config,
    } = pipeline;

    let mut graph = StateGraph::<AgentState>::new();
    graph
        .add_node(Box::new(GetUrlNode { recommender }))
        .add_node(Box::new(CrawlNode { crawler }))
        .add_node(Box::new(AnalyzeNode { analyzer }))
        .add_node(Box::new(SaveNode { config }))
        .add_edge("get_url")
        .add_edge("crawl")
        .add_edge("analyze")
        .add_edge("save");
    Ok(graph.compile()?)
}

/// Build the workflow and run it once from `state`.
///
/// # Errors
///
/// Returns graph errors; stage failures are logged and skipped inside the
/// nodes.
pub async fn run_workflow(pipeline: NewsPipeline, state: AgentState) -> Result<AgentState> {
    let graph = news_workflow(pipeline)?;
    let state = graph.invoke(state).await?;
    info!(
        news = state.news_data.len(),
        factors = state.factor_data.len(),
        status = state.save_status.as_deref().unwrap_or("not saved"),
        "Workflow finished"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    use super::*;
    use crate::chat::ChatResponse;
    use crate::crawler::{LlmExtractor, PageFetcher, WebCrawler};
    use crate::error::CrawlError;
    use crate::llms::MockProvider;
    use crate::news::{CrawlOptions, DEFAULT_NEWS_URL, ImpactLabel};

    struct MapFetcher(HashMap<String, &'static str>);

    #[async_trait]
    impl PageFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.0
                .get(url)
                .map(|page| (*page).to_owned())
                .ok_or_else(|| CrawlError::fetch(format!("no page for {url}")).into())
        }
    }

    fn provider() -> Arc<MockProvider> {
        Arc::new(MockProvider::from_fn(|req| {
            let text = req.last_user_text().unwrap_or_default();
            let reply = if text.contains("LISTING") {
                r#"{"items": [{"url": "https://news.test/a/1.html"}, {"url": "https://news.test/a/2.html"}]}"#
            } else if text.contains("GOOD NEWS") {
                r#"{"news_time": "09:30", "news_title": "up", "news_text": "profit", "company_involved": "A", "stock_code": "600000", "stock_short_name": "a"}"#
            } else if text.contains("BAD NEWS") {
                r#"{"news_time": "10:00", "news_title": "down", "news_text": "loss", "company_involved": "B", "stock_code": "000001", "stock_short_name": "b"}"#
            } else if text.contains("profit") {
                r#"Result: {"summary": "利润增长", "impact": +1}"#
            } else if text.contains("loss") {
                r#"{"summary": "亏损", "impact": "-1"}"#
            } else {
                "?"
            };
            Ok(ChatResponse::from_message(Message::assistant(reply)))
        }))
    }

    fn pipeline(dir: &TempDir, listing: &str) -> NewsPipeline {
        let pages = HashMap::from([
            (listing.to_owned(), "LISTING"),
            ("https://news.test/a/1.html".to_owned(), "GOOD NEWS"),
            ("https://news.test/a/2.html".to_owned(), "BAD NEWS"),
        ]);
        let provider = provider();
        let web = WebCrawler::new(
            Arc::new(MapFetcher(pages)),
            LlmExtractor::new(provider.clone()),
        );
        let crawler = NewsCrawler::new(
            web,
            CrawlOptions {
                news_output: Some(dir.child("news.csv").path().to_path_buf()),
                ..CrawlOptions::default()
            },
        );
        NewsPipeline::new(crawler, ImpactAnalyzer::new(provider)).with_config(WorkflowConfig {
            factor_output: dir.child("factor.csv").path().to_path_buf(),
            factor_header: HeaderStyle::Chinese,
        })
    }

    #[tokio::test]
    async fn runs_all_stages() {
        let dir = TempDir::new().unwrap();
        let state = run_workflow(
            pipeline(&dir, "https://news.test/list"),
            AgentState::with_url("https://news.test/list"),
        )
        .await
        .unwrap();

        assert_eq!(state.news_data.len(), 2);
        assert_eq!(state.factor_data.len(), 2);
        assert_eq!(state.factor_data[0].impact_direction, ImpactLabel::Positive);
        assert_eq!(state.factor_data[1].impact_direction, ImpactLabel::Negative);

        let factor = dir.child("factor.csv");
        let status = state.save_status.unwrap();
        assert_eq!(
            status,
            format!("Successfully saved 2 records to {}", factor.path().display())
        );
        let csv = std::fs::read_to_string(factor.path()).unwrap();
        assert!(csv.starts_with("公司名称,股票代码,股票简称,新闻时间,新闻标题,影响方向,新闻摘要"));
        assert!(csv.contains(",1,利润增长"));
        assert!(dir.child("news.csv").path().exists());
    }

    #[tokio::test]
    async fn empty_crawl_ends_before_analysis() {
        let dir = TempDir::new().unwrap();
        let state = run_workflow(
            pipeline(&dir, "https://news.test/list"),
            AgentState::with_url("https://news.test/elsewhere"),
        )
        .await
        .unwrap();

        assert!(state.news_data.is_empty());
        assert!(state.factor_data.is_empty());
        assert!(state.save_status.is_none());
        assert!(!dir.child("factor.csv").path().exists());
    }

    #[tokio::test]
    async fn get_url_defaults_without_preset() {
        let dir = TempDir::new().unwrap();
        let state = run_workflow(pipeline(&dir, DEFAULT_NEWS_URL), AgentState::from_query("今天的新闻"))
            .await
            .unwrap();

        assert_eq!(state.url.as_deref(), Some(DEFAULT_NEWS_URL));
        assert_eq!(state.factor_data.len(), 2);
    }

    #[test]
    fn graph_order() {
        let dir = TempDir::new().unwrap();
        let graph = news_workflow(pipeline(&dir, DEFAULT_NEWS_URL)).unwrap();
        assert_eq!(graph.edge_order(), ["get_url", "crawl", "analyze", "save"]);
    }
}
