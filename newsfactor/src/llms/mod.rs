//! LLM backend implementations.
//!
//! Every supported vendor speaks the chat completions wire format, so a
//! single [`OpenAI`] client covers them all; [`ProviderKind`] carries the
//! per-vendor endpoint, credential variable and default model.
//!
//! # Available Backends
//!
//! - [`openai`] - any OpenAI-compatible endpoint (DeepSeek, DashScope, OpenAI)
//! - [`mock`] - scripted provider for tests

pub mod mock;
pub mod openai;
mod provider;

pub use mock::MockProvider;
pub use openai::{OpenAI, OpenAIConfig};
pub use provider::{ModelSpec, ProviderKind};
