//! Plain multi-turn chat with a transcript.

use std::path::Path;
use std::sync::Arc;

use crate::chat::{ChatProvider, ChatRequest};
use crate::error::Result;
use crate::message::{Message, Role};

/// Default transcript file name.
pub const TRANSCRIPT_FILE: &str = "logger.txt";

/// Render user and assistant turns as a transcript; other roles are omitted.
#[must_use]
pub fn render_transcript(messages: &[Message]) -> String {
    let mut out = String::from("对话记录：\n");
    for message in messages {
        let speaker = match message.role {
            Role::User => "User",
            Role::Assistant => "AI",
            Role::System | Role::Tool => continue,
        };
        out.push_str(speaker);
        out.push_str(": ");
        out.push_str(message.text().unwrap_or_default());
        out.push('\n');
    }
    out.push_str("\n对话结束。\n");
    out
}

/// A conversation without a system prompt.
pub struct ChatSession {
    provider: Arc<dyn ChatProvider>,
    history: Vec<Message>,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("provider", &self.provider.provider_name())
            .field("turns", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl ChatSession {
    /// Start an empty conversation.
    #[must_use]
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            history: Vec::new(),
        }
    }

    /// Messages exchanged so far.
    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Send one user message and return the reply.
    ///
    /// # Errors
    ///
    /// Propagates provider failures; the user message is then dropped.
    pub async fn send(&mut self, text: &str) -> Result<String> {
        self.history.push(Message::user(text));
        let request = ChatRequest::default()
            .messages(self.history.clone());
        match self.provider.chat(&request).await {
            Ok(response) => {
                let reply = response.text().unwrap_or_default().to_owned();
                self.history.push(Message::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }

    /// The transcript of the conversation so far.
    #[must_use]
    pub fn transcript(&self) -> String {
        render_transcript(&self.history)
    }

    /// Write the transcript to `path`, replacing any previous file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub async fn save_transcript(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, self.transcript()).await?;
        Ok(())
    }
}
