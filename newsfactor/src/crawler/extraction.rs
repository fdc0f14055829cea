//! Schema-guided extraction of structured items from page markdown.

use std::sync::Arc;

use schemars::JsonSchema;
use serde_json::Value;
use tracing::{debug, warn};

use crate::chat::{ChatProvider, ChatRequest, ResponseFormat, generate_json_schema};
use crate::error::{CrawlError, Error, Result};

/// What to extract from a page: a JSON schema per item plus an instruction.
#[derive(Debug, Clone)]
pub struct ExtractionStrategy {
    /// Name of the item type, e.g. `NewsUrl`.
    pub schema_name: String,
    /// JSON schema each extracted item should match.
    pub schema: Value,
    /// Natural-language instruction for the extraction model.
    pub instruction: String,
    /// Maximum characters of markdown sent per request.
    pub chunk_size: usize,
}

impl ExtractionStrategy {
    /// Default chunk size in characters.
    pub const DEFAULT_CHUNK_SIZE: usize = 6_000;

    /// Create a strategy with an explicit schema.
    #[must_use]
    pub fn new(schema_name: impl Into<String>, schema: Value, instruction: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            schema,
            instruction: instruction.into(),
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    /// Create a strategy whose schema is generated from `T`.
    #[must_use]
    pub fn for_type<T: JsonSchema>(instruction: impl Into<String>) -> Self {
        let (name, schema) = generate_json_schema::<T>();
        Self::new(name, schema, instruction)
    }

    /// Set the chunk size in characters; zero is treated as one.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn system_prompt(&self) -> String {
        let schema = serde_json::to_string_pretty(&self.schema).unwrap_or_default();
        format!(
            "You extract structured data from web page content given in markdown.\n\
             Every extracted item must be a JSON object matching this `{name}` schema:\n\
             {schema}\n\n\
             Reply with a single JSON object of the form {{\"items\": [...]}}. \
             If nothing matches, reply with {{\"items\": []}}. Do not invent data.",
            name = self.schema_name,
        )
    }
}

/// Split `text` into chunks of at most `chunk_size` characters, preferring
/// line boundaries.
#[must_use]
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > chunk_size && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > chunk_size {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(chunk_size) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks.retain(|c| !c.trim().is_empty());
    chunks
}

/// Turn an extraction reply into a list of items.
///
/// Accepts `{"items": [...]}`, a bare array, or a single object (treated as
/// one item). Markdown code fences around the JSON are ignored.
///
/// # Errors
///
/// Fails when the reply is not JSON or is a JSON scalar.
pub fn parse_items(reply: &str) -> Result<Vec<Value>> {
    let trimmed = strip_code_fence(reply);
    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| CrawlError::extraction(format!("reply is not JSON: {e}")))?;

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => {
                map.insert("items".to_owned(), other);
                Ok(vec![Value::Object(map)])
            }
            None => Ok(vec![Value::Object(map)]),
        },
        other => Err(CrawlError::extraction(format!("unexpected JSON reply: {other}")).into()),
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Runs an [`ExtractionStrategy`] against page markdown through a chat model.
#[derive(Clone)]
pub struct LlmExtractor {
    provider: Arc<dyn ChatProvider>,
    temperature: Option<f32>,
}

impl std::fmt::Debug for LlmExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmExtractor")
            .field("provider", &self.provider.provider_name())
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl LlmExtractor {
    /// Create an extractor using the provider's default model at temperature 0.
    #[must_use]
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            temperature: Some(0.0),
        }
    }

    /// Override the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Extract items from `markdown`, concatenating results across chunks.
    ///
    /// A chunk whose reply cannot be parsed is skipped with a warning.
    ///
    /// # Errors
    ///
    /// Fails if the page is empty or no chunk produced a usable reply.
    pub async fn extract(&self, markdown: &str, strategy: &ExtractionStrategy) -> Result<Vec<Value>> {
        let chunks = chunk_text(markdown, strategy.chunk_size);
        if chunks.is_empty() {
            return Err(CrawlError::extraction("page has no content").into());
        }

        let system = strategy.system_prompt();
        let mut items = Vec::new();
        let mut succeeded = 0usize;
        let mut last_error: Option<Error> = None;

        for (index, chunk) in chunks.iter().enumerate() {
            let request = ChatRequest::default()
                .system(system.clone())
                .user(format!("{}\n\n<content>\n{chunk}\n</content>", strategy.instruction))
                .temperature_opt(self.temperature)
                .response_format(ResponseFormat::json());

            let outcome = match self.provider.chat(&request).await {
                Ok(response) => parse_items(response.text().unwrap_or_default()),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(found) => {
                    debug!(chunk = index, items = found.len(), "Extracted chunk");
                    succeeded += 1;
                    items.extend(found);
                }
                Err(e) => {
                    warn!(chunk = index, error = %e, "Chunk extraction failed");
                    last_error = Some(e);
                }
            }
        }

        match (succeeded, last_error) {
            (0, Some(e)) => Err(e),
            _ => Ok(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::MockProvider;

    #[test]
    fn chunks_respect_size_and_lines() {
        let text = "aaaa\nbbbb\ncccc\n";
        let chunks = chunk_text(text, 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n", "cccc\n"]);

        let chunks = chunk_text("上市公司公告", 4);
        assert_eq!(chunks, vec!["上市公司", "公告"]);

        assert!(chunk_text("  \n\n", 10).is_empty());
    }

    #[test]
    fn parses_all_reply_shapes() {
        let items = parse_items(r#"{"items": [{"url": "a"}, {"url": "b"}]}"#).unwrap();
        assert_eq!(items.len(), 2);

        let items = parse_items(r#"[{"url": "a"}]"#).unwrap();
        assert_eq!(items[0]["url"], "a");

        let items = parse_items("```json\n{\"url\": \"a\"}\n```").unwrap();
        assert_eq!(items, vec![serde_json::json!({"url": "a"})]);

        assert!(parse_items("42").is_err());
        assert!(parse_items("no json here").is_err());
    }

    #[tokio::test]
    async fn extract_concatenates_chunks() {
        let provider = Arc::new(MockProvider::new([
            r#"{"items": [{"url": "https://a"}]}"#,
            r#"[{"url": "https://b"}]"#,
        ]));
        let extractor = LlmExtractor::new(provider.clone());
        let strategy = ExtractionStrategy::new("NewsUrl", serde_json::json!({}), "find links")
            .with_chunk_size(5);

        let items = extractor.extract("1234\n5678\n", &strategy).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(provider.calls(), 2);

        let requests = provider.requests().await;
        assert!(matches!(
            requests[0].response_format,
            Some(ResponseFormat::JsonObject)
        ));
        assert!(requests[0].last_user_text().unwrap().contains("1234"));
    }

    #[tokio::test]
    async fn extract_fails_when_every_chunk_fails() {
        let provider = Arc::new(MockProvider::new(["not json"]));
        let extractor = LlmExtractor::new(provider);
        let strategy = ExtractionStrategy::new("NewsUrl", serde_json::json!({}), "x");

        assert!(extractor.extract("content", &strategy).await.is_err());
        assert!(extractor.extract("", &strategy).await.is_err());
    }
}
