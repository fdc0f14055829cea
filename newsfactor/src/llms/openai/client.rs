//! OpenAI-compatible API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::chat::ChatRequest;
use crate::error::{LlmError, Result};
use crate::llms::provider::ProviderKind;
use crate::message::Message;
use crate::tool::ToolDefinition;

use super::config::OpenAIConfig;
use super::types::{
    OpenAIChatRequest, OpenAIErrorResponse, OpenAIFunction, OpenAIFunctionCall, OpenAIMessage,
    OpenAIResponseFormat, OpenAITool, OpenAIToolCall,
};

/// Client for any endpoint speaking the chat completions protocol.
#[derive(Debug, Clone)]
pub struct OpenAI {
    pub(crate) config: Arc<OpenAIConfig>,
    pub(crate) client: Client,
}

impl OpenAI {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Fails when the API key is empty or the HTTP client cannot be built.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::auth(config.provider.as_str(), "API key is required").into());
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Get the vendor preset.
    #[must_use]
    pub fn provider(&self) -> ProviderKind {
        self.config.provider
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the default model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub(crate) fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    pub(crate) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
    }

    pub(crate) fn convert_message(msg: &Message) -> OpenAIMessage {
        let tool_calls = msg.tool_calls.as_ref().map(|calls| {
            calls
                .iter()
                .map(|tc| OpenAIToolCall {
                    id: tc.id.clone(),
                    call_type: "function".to_owned(),
                    function: OpenAIFunctionCall {
                        name: tc.function.name.clone(),
                        arguments: tc.function.arguments.clone(),
                    },
                })
                .collect()
        });

        OpenAIMessage {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
            name: msg.name.clone(),
        }
    }

    pub(crate) fn convert_tool(tool: &ToolDefinition) -> OpenAITool {
        OpenAITool {
            tool_type: "function".to_owned(),
            function: OpenAIFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            },
        }
    }

    pub(crate) fn build_body(&self, request: &ChatRequest) -> OpenAIChatRequest {
        let model = if request.model.is_empty() {
            self.config.model.clone()
        } else {
            request.model.clone()
        };

        OpenAIChatRequest {
            model,
            messages: request.messages.iter().map(Self::convert_message).collect(),
            temperature: request.temperature,
            tools: request
                .tools
                .as_ref()
                .map(|t| t.iter().map(Self::convert_tool).collect()),
            tool_choice: request.tool_choice.clone(),
            response_format: request
                .response_format
                .as_ref()
                .map(OpenAIResponseFormat::from_response_format),
            stream: false,
        }
    }

    /// Map an error response to an [`LlmError`].
    pub(crate) fn parse_error(&self, status: u16, body: &str) -> LlmError {
        let provider = self.config.provider.as_str();
        if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(body) {
            let error = error_response.error;
            let code = match error.code {
                Some(Value::String(s)) => s,
                Some(Value::Null) | None => error.error_type.unwrap_or_default(),
                Some(other) => other.to_string(),
            };

            return match status {
                401 | 403 => LlmError::auth(provider, error.message),
                429 => LlmError::rate_limited(provider),
                _ => LlmError::provider_code(provider, code, error.message),
            };
        }

        match status {
            401 | 403 => LlmError::auth(provider, body.to_owned()),
            429 => LlmError::rate_limited(provider),
            _ => LlmError::http_status(status, body.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ResponseFormat;
    use crate::message::ToolCall;

    fn client() -> OpenAI {
        OpenAI::new(OpenAIConfig::for_provider(ProviderKind::DeepSeek, "sk-test")).unwrap()
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = OpenAI::new(OpenAIConfig::for_provider(ProviderKind::DashScope, "")).unwrap_err();
        assert_eq!(err.to_string(), "LLM error: [dashscope] API key is required");
    }

    #[test]
    fn message_conversion() {
        let converted = OpenAI::convert_message(&Message::user("Hello!"));
        assert_eq!(converted.role, "user");
        assert_eq!(converted.content.as_deref(), Some("Hello!"));

        let call = Message::assistant_tool_calls(vec![ToolCall::function("c1", "save", "{}")]);
        let converted = OpenAI::convert_message(&call);
        assert!(converted.content.is_none());
        assert_eq!(converted.tool_calls.unwrap()[0].call_type, "function");
    }

    #[test]
    fn body_falls_back_to_configured_model() {
        let client = client();
        let body = client.build_body(
            &ChatRequest::default()
                .user("hi")
                .response_format(ResponseFormat::json()),
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["stream"], false);
        assert!(json.get("tools").is_none());

        let body = client.build_body(&ChatRequest {
            model: "deepseek-reasoner".to_owned(),
            ..ChatRequest::default()
        });
        assert_eq!(body.model, "deepseek-reasoner");
    }

    #[test]
    fn error_mapping() {
        let client = client();
        let body = r#"{"error":{"message":"bad key","type":"authentication_error","code":null}}"#;
        assert!(matches!(client.parse_error(401, body), LlmError::Auth { .. }));
        assert!(matches!(
            client.parse_error(429, body),
            LlmError::RateLimited { .. }
        ));

        let body = r#"{"error":{"message":"oops","type":"invalid_request_error","code":"bad_param"}}"#;
        match client.parse_error(400, body) {
            LlmError::Provider { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("bad_param"));
                assert_eq!(message, "oops");
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            client.parse_error(502, "bad gateway"),
            LlmError::HttpStatus { status: 502, .. }
        ));
    }
}
