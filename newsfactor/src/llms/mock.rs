//! Mock provider for testing.
//!
//! Returns predefined replies in sequence, or delegates to a closure that
//! inspects each request. Every request is recorded for later assertions.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::Result;
use crate::message::Message;

type Handler = Box<dyn Fn(&ChatRequest) -> Result<ChatResponse> + Send + Sync>;

enum Script {
    Cycle(Vec<Message>),
    Handler(Handler),
}

/// A scripted [`ChatProvider`].
///
/// # Example
///
/// ```rust,ignore
/// let provider = MockProvider::new(["first", "second"]);
/// // "first", "second", "first", ...
/// ```
pub struct MockProvider {
    model: String,
    script: Script,
    index: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    /// Create a provider cycling through plain-text replies.
    #[must_use]
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_messages(replies.into_iter().map(Message::assistant).collect())
    }

    /// Create a provider cycling through full assistant messages, e.g. ones
    /// carrying tool calls.
    #[must_use]
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self::build(Script::Cycle(messages))
    }

    /// Create a provider that answers each request with `handler`.
    #[must_use]
    pub fn from_fn<F>(handler: F) -> Self
    where
        F: Fn(&ChatRequest) -> Result<ChatResponse> + Send + Sync + 'static,
    {
        Self::build(Script::Handler(Box::new(handler)))
    }

    fn build(script: Script) -> Self {
        Self {
            model: "mock-model".to_owned(),
            script,
            index: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockProvider")
            .field("model", &self.model)
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().await.push(request.clone());
        let index = self.index.fetch_add(1, Ordering::SeqCst);

        match &self.script {
            Script::Handler(handler) => handler(request),
            Script::Cycle(messages) => {
                let message = if messages.is_empty() {
                    Message::assistant("No response")
                } else {
                    messages[index % messages.len()].clone()
                };
                let mut response = ChatResponse::from_message(message);
                response.model = Some(self.model.clone());
                Ok(response)
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}
