//! Conversational news assistant.

use std::sync::Arc;

use tracing::debug;

use crate::chat::{ChatProvider, ChatRequest};
use crate::error::Result;
use crate::message::Message;
use crate::news::find_urls;

/// System prompt of the assistant.
pub const ASSISTANT_PROMPT: &str = "你是一个专业的金融新闻助手。当用户询问新闻时，请从以下URL中选择最合适的推荐给用户：\n\
1. https://kuaixun.eastmoney.com/ssgs.html (东方财富上市公司快讯)\n\n\
请直接在回答中包含选择的URL。对于其他问题，请正常回答。";

/// One assistant turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    /// Reply text.
    pub text: String,
    /// Links found in the reply, in order.
    pub urls: Vec<String>,
}

impl AssistantReply {
    /// The first link, used as the crawl target.
    #[must_use]
    pub fn first_url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }
}

/// A running conversation with the news assistant.
pub struct AssistantSession {
    provider: Arc<dyn ChatProvider>,
    history: Vec<Message>,
}

impl std::fmt::Debug for AssistantSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantSession")
            .field("provider", &self.provider.provider_name())
            .field("turns", &self.history.len())
            .finish()
    }
}

impl AssistantSession {
    /// Start a conversation seeded with [`ASSISTANT_PROMPT`].
    #[must_use]
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            history: vec![Message::system(ASSISTANT_PROMPT)],
        }
    }

    /// Conversation so far, starting with the system prompt.
    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Send one user message and record the reply.
    ///
    /// # Errors
    ///
    /// Propagates provider failures; the user message is then dropped from
    /// the history.
    pub async fn send(&mut self, text: &str) -> Result<AssistantReply> {
        self.history.push(Message::user(text));
        let request = ChatRequest::default()
            .messages(self.history.clone());

        let response = match self.provider.chat(&request).await {
            Ok(response) => response,
            Err(e) => {
                self.history.pop();
                return Err(e);
            }
        };

        let reply = response.text().unwrap_or_default().to_owned();
        self.history.push(Message::assistant(reply.clone()));
        let urls = find_urls(&reply);
        debug!(urls = urls.len(), "Assistant replied");
        Ok(AssistantReply { text: reply, urls })
    }
}
