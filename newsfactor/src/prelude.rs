//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use newsfactor::prelude::*;
//! ```

pub use crate::error::{CrawlError, Error, LlmError, Result, ToolError};

pub use crate::chat::{ChatProvider, ChatRequest, ChatResponse, ResponseFormat, StopReason, ToolChoice, Usage};
pub use crate::crawler::{
    CrawlResult, ExtractionStrategy, HttpFetcher, LlmExtractor, PageFetcher, WebCrawler,
};
pub use crate::graph::{CompiledStateGraph, GraphError, Next, Node, StateGraph};
pub use crate::llms::{MockProvider, ModelSpec, OpenAI, OpenAIConfig, ProviderKind};
pub use crate::message::{FunctionCall, Message, Role, ToolCall};
pub use crate::news::{
    CrawlOptions, HeaderStyle, ImpactAnalyzer, ImpactLabel, ImpactRecord, NewsCrawler, NewsRecord,
    UrlRecommender, save_records,
};
pub use crate::session::{AssistantSession, ChatSession, Drafter};
pub use crate::tool::{BoxedTool, DynTool, Tool, ToolBox, ToolDefinition, ToolResult};
pub use crate::workflow::{AgentState, NewsPipeline, WorkflowConfig, news_workflow, run_workflow};
