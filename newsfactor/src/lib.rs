//! Newsfactor - LLM-driven financial news crawling and impact scoring
//!
//! This crate crawls a news listing page, extracts structured records through
//! a chat model, scores each record's market impact and writes CSV snapshots.
//! A small state graph wires the stages together; interactive sessions cover
//! the conversational, chat-only and drafting front ends.

pub mod chat;
pub mod crawler;
pub mod error;
pub mod graph;
pub mod llms;
pub mod message;
pub mod news;
pub mod prelude;
pub mod session;
pub mod tool;
pub mod workflow;

pub use error::{CrawlError, Error, LlmError, Result, ToolError};
