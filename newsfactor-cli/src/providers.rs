//! Building library components from configuration.

use std::sync::Arc;

use newsfactor::chat::ChatProvider;
use newsfactor::crawler::{HttpFetcher, LlmExtractor, WebCrawler};
use newsfactor::llms::{ModelSpec, OpenAI, OpenAIConfig};
use newsfactor::news::{CrawlOptions, ImpactAnalyzer, NewsCrawler, UrlRecommender};
use newsfactor::workflow::{NewsPipeline, WorkflowConfig};
use tracing::info;

use crate::config::{AppConfig, ModelConfig};
use crate::error::Result;

/// Create a chat client for one configured model.
pub fn build_provider(config: &ModelConfig) -> Result<Arc<dyn ChatProvider>> {
    let spec: ModelSpec = config.model.parse()?;
    let mut client_config = match &config.api_key {
        Some(key) => OpenAIConfig::for_provider(spec.provider, key.clone()).with_model(spec.model.clone()),
        None => OpenAIConfig::from_spec(&spec)?,
    };
    if let Some(base) = &config.api_base {
        client_config = client_config.with_base_url(base.clone());
    }

    let client = OpenAI::new(client_config)?;
    info!(provider = %spec.provider, model = %client.model(), "Using chat model");
    Ok(Arc::new(client))
}

/// Crawl options from the config file, before command-line overrides.
pub fn crawl_options(config: &AppConfig) -> CrawlOptions {
    CrawlOptions {
        link_filter: config.crawler.link_filter.clone(),
        strict: config.crawler.strict,
        max_links: config.crawler.max_links,
        news_output: Some(config.output.news_file.clone()),
        news_header: config.output.news_header,
        chunk_size: config.crawler.chunk_size,
    }
}

/// Create the two-level news crawler.
pub fn build_crawler(config: &AppConfig, options: CrawlOptions) -> Result<NewsCrawler> {
    let fetcher = HttpFetcher::with_timeout(config.crawler.timeout_secs)?
        .with_max_output_length(config.crawler.max_output_length);
    let extraction = &config.providers.extraction;
    let mut extractor = LlmExtractor::new(build_provider(extraction)?);
    if extraction.temperature.is_some() {
        extractor = extractor.with_temperature(extraction.temperature);
    }
    let web = WebCrawler::new(Arc::new(fetcher), extractor);
    Ok(NewsCrawler::new(web, options))
}

/// Create the full workflow pipeline.
pub fn build_pipeline(
    config: &AppConfig,
    options: CrawlOptions,
    workflow: WorkflowConfig,
    recommend: bool,
) -> Result<NewsPipeline> {
    let crawler = build_crawler(config, options)?;
    let analysis = &config.providers.analysis;
    let analyzer =
        ImpactAnalyzer::new(build_provider(analysis)?).with_temperature(analysis.temperature);

    let mut pipeline = NewsPipeline::new(crawler, analyzer).with_config(workflow);
    if recommend {
        pipeline = pipeline.with_recommender(UrlRecommender::new(build_provider(
            &config.providers.chat,
        )?));
    }
    Ok(pipeline)
}
