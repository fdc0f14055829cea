//! Chat types and the provider trait for LLM calls.
//!
//! This module provides:
//! - [`ChatRequest`]: Request parameters for chat completions
//! - [`ChatResponse`]: Response from chat completions
//! - [`ChatProvider`]: Core trait implemented by every backend
//!
//! # Example
//!
//! ```rust,ignore
//! use newsfactor::prelude::*;
//!
//! let request = ChatRequest::default()
//!     .system("You are a financial news assistant.")
//!     .user("Summarise today's listed-company news.")
//!     .temperature(0.0);
//!
//! let response = provider.chat(&request).await?;
//! println!("{}", response.text().unwrap_or_default());
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::message::{Message, ToolCall};
use crate::tool::ToolDefinition;

/// A chat completion request to an LLM.
///
/// An empty `model` means "use the provider's configured model".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier (e.g., "deepseek-chat", "qwen-plus").
    #[serde(default)]
    pub model: String,

    /// Conversation messages.
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Sampling temperature (0.0 to 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Tools available for the model to call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,

    /// Controls how the model uses tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,

    /// Response format specification (JSON mode / structured outputs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatRequest {
    /// Adds a system message.
    #[must_use]
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::system(content));
        self
    }

    /// Adds a user message.
    #[must_use]
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    /// Sets all messages.
    #[must_use]
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Sets temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets an optional temperature, leaving the provider default when `None`.
    #[must_use]
    pub const fn temperature_opt(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets tools.
    #[must_use]
    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Sets tool choice.
    #[must_use]
    pub fn tool_choice(mut self, choice: impl Into<ToolChoice>) -> Self {
        self.tool_choice = Some(choice.into().to_value());
        self
    }

    /// Sets response format.
    #[must_use]
    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Returns the text of the last user message, if any.
    #[must_use]
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::message::Role::User)
            .and_then(Message::text)
    }
}

/// Controls how the model uses tools.
#[derive(Debug, Clone, Default)]
pub enum ToolChoice {
    /// Model decides whether to use tools.
    #[default]
    Auto,
    /// Model must use at least one tool.
    Required,
    /// Model cannot use any tools.
    None,
    /// Model must use the specified function.
    Function(String),
}

impl ToolChoice {
    /// Converts to JSON value for serialization.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Auto => Value::String("auto".to_owned()),
            Self::Required => Value::String("required".to_owned()),
            Self::None => Value::String("none".to_owned()),
            Self::Function(name) => serde_json::json!({
                "type": "function",
                "function": {"name": name}
            }),
        }
    }
}

impl From<&str> for ToolChoice {
    fn from(s: &str) -> Self {
        match s {
            "auto" => Self::Auto,
            "required" => Self::Required,
            "none" => Self::None,
            name => Self::Function(name.to_owned()),
        }
    }
}

/// Response format specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Plain text response.
    Text,
    /// JSON object response.
    JsonObject,
}

impl ResponseFormat {
    /// Creates a JSON object format.
    #[must_use]
    pub const fn json() -> Self {
        Self::JsonObject
    }
}

/// Generate a JSON Schema from a type implementing [`schemars::JsonSchema`].
///
/// Returns `(name, schema)` with the `$schema` meta field removed, since
/// model APIs don't need it.
#[must_use]
pub fn generate_json_schema<T: schemars::JsonSchema>() -> (String, Value) {
    let root = schemars::schema_for!(T);
    let mut schema_value = serde_json::to_value(&root).unwrap_or_default();

    if let Value::Object(ref mut map) = schema_value {
        map.remove("$schema");
    }

    let name = <T as schemars::JsonSchema>::schema_name();
    (name.into_owned(), schema_value)
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of the reply.
    #[default]
    Stop,
    /// Token limit reached.
    Length,
    /// The model requested tool calls.
    ToolCalls,
    /// Output was filtered by the provider.
    ContentFilter,
}

/// Token usage statistics reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt.
    #[serde(default, alias = "prompt_tokens")]
    pub input_tokens: u32,
    /// Number of tokens in the completion.
    #[serde(default, alias = "completion_tokens")]
    pub output_tokens: u32,
    /// Total tokens used.
    #[serde(default)]
    pub total_tokens: u32,
}

/// A chat completion response from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant message.
    pub message: Message,
    /// Why generation stopped.
    #[serde(default)]
    pub stop_reason: StopReason,
    /// Token usage, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// The model that produced the reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Provider response id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ChatResponse {
    /// Wraps an assistant message in a response with default metadata.
    #[must_use]
    pub fn from_message(message: Message) -> Self {
        let stop_reason = if message.has_tool_calls() {
            StopReason::ToolCalls
        } else {
            StopReason::Stop
        };
        Self {
            message,
            stop_reason,
            usage: None,
            model: None,
            id: None,
        }
    }

    /// Returns the reply text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.message.text()
    }

    /// Returns the tool calls in the reply.
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.message.tool_calls()
    }
}

/// Core trait for chat-capable LLM providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends a chat completion request.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Short provider name used in logs and errors.
    fn provider_name(&self) -> &'static str;

    /// The model used when a request leaves `model` empty.
    fn default_model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(schemars::JsonSchema)]
    #[allow(dead_code)]
    struct Headline {
        /// Full title.
        title: String,
    }

    #[test]
    fn builder_appends_messages() {
        let req = ChatRequest::default()
            .system("sys")
            .user("first")
            .user("second")
            .temperature(0.0);

        assert!(req.model.is_empty());
        assert_eq!(req.messages.len(), 3);
        assert_eq!(req.last_user_text(), Some("second"));
        assert_eq!(req.temperature, Some(0.0));
    }

    #[test]
    fn tool_choice_values() {
        assert_eq!(ToolChoice::from("auto").to_value(), Value::from("auto"));
        assert_eq!(
            ToolChoice::from("save").to_value(),
            serde_json::json!({"type": "function", "function": {"name": "save"}})
        );
    }

    #[test]
    fn generated_schema_drops_meta_field() {
        let (name, schema) = generate_json_schema::<Headline>();
        assert_eq!(name, "Headline");
        assert!(schema.get("$schema").is_none());
        assert_eq!(
            schema["properties"]["title"]["description"],
            Value::from("Full title.")
        );
    }
}
