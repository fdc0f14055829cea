//! Client for OpenAI-compatible chat completion endpoints.

mod chat;
mod client;
mod config;
mod types;

pub use client::OpenAI;
pub use config::OpenAIConfig;
