//! Tool-calling document drafter.
//!
//! The model edits a shared document through two tools: `update` replaces
//! its content and `save` writes it to a text file, which ends the session.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::chat::{ChatProvider, ChatRequest, ToolChoice, generate_json_schema};
use crate::error::{Result, ToolError};
use crate::message::Message;
use crate::tool::{Tool, ToolBox, ToolResult};

/// The document both tools operate on.
pub type SharedDocument = Arc<Mutex<String>>;

/// First user turn when the session starts.
pub const OPENING_MESSAGE: &str = "我已经准备好更新文档，你想要创造一些什么?";

/// Arguments of [`UpdateTool`].
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateArgs {
    /// The complete new document content.
    pub content: String,
}

/// Replaces the document content.
#[derive(Debug, Clone)]
pub struct UpdateTool {
    document: SharedDocument,
}

impl UpdateTool {
    /// Tool bound to `document`.
    #[must_use]
    pub const fn new(document: SharedDocument) -> Self {
        Self { document }
    }
}

#[async_trait]
impl Tool for UpdateTool {
    const NAME: &'static str = "update";
    type Args = UpdateArgs;
    type Output = String;

    fn description(&self) -> String {
        "Updates the document with the provided content.".to_owned()
    }

    fn parameters_schema(&self) -> Value {
        generate_json_schema::<UpdateArgs>().1
    }

    async fn call(&self, args: Self::Args) -> ToolResult<Self::Output> {
        let mut document = self.document.lock().await;
        *document = args.content;
        Ok(format!("这个文档已经被成功更新了，目前的内容为:\n{document}"))
    }
}

/// Arguments of [`SaveTool`].
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SaveArgs {
    /// Name for the text file.
    pub filename: String,
}

/// Writes the document to a `.txt` file.
#[derive(Debug, Clone)]
pub struct SaveTool {
    document: SharedDocument,
    dir: Option<PathBuf>,
    saved: Arc<Mutex<Option<PathBuf>>>,
}

impl SaveTool {
    /// Tool bound to `document`, writing relative to the working directory.
    #[must_use]
    pub fn new(document: SharedDocument) -> Self {
        Self {
            document,
            dir: None,
            saved: Arc::new(Mutex::new(None)),
        }
    }

    /// Write files under `dir` instead of the working directory.
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Path of the last successful save.
    pub async fn saved_path(&self) -> Option<PathBuf> {
        self.saved.lock().await.clone()
    }

    fn target(&self, filename: &str) -> PathBuf {
        let filename = if filename.ends_with(".txt") {
            filename.to_owned()
        } else {
            format!("{filename}.txt")
        };
        match &self.dir {
            Some(dir) => dir.join(filename),
            None => PathBuf::from(filename),
        }
    }
}

#[async_trait]
impl Tool for SaveTool {
    const NAME: &'static str = "save";
    type Args = SaveArgs;
    type Output = String;

    fn description(&self) -> String {
        "Save the current document to a text file and finish the process.".to_owned()
    }

    fn parameters_schema(&self) -> Value {
        generate_json_schema::<SaveArgs>().1
    }

    async fn call(&self, args: Self::Args) -> ToolResult<Self::Output> {
        if args.filename.trim().is_empty() {
            return Err(ToolError::invalid_args("filename must not be empty"));
        }
        let path = self.target(args.filename.trim());
        let content = self.document.lock().await.clone();
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| ToolError::execution(format!("保存错误: {e}")))?;

        info!(path = %path.display(), "Document saved");
        let status = format!("文档被成功保留在'{}'.", path.display());
        *self.saved.lock().await = Some(path);
        Ok(status)
    }
}

/// Result of one tool call in a drafter turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    /// Tool name.
    pub name: String,
    /// Tool output, or the error text.
    pub output: String,
    /// Whether the tool succeeded.
    pub success: bool,
}

/// What happened during one [`Drafter::step`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftTurn {
    /// Model text, if any.
    pub reply: Option<String>,
    /// Tool calls executed in this turn, in order.
    pub tool_results: Vec<ToolOutcome>,
    /// Set once the document has been saved.
    pub saved_to: Option<PathBuf>,
}

/// Writing assistant session.
pub struct Drafter {
    provider: Arc<dyn ChatProvider>,
    document: SharedDocument,
    save_tool: SaveTool,
    tools: ToolBox,
    history: Vec<Message>,
}

impl std::fmt::Debug for Drafter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Drafter")
            .field("provider", &self.provider.provider_name())
            .field("tools", &self.tools)
            .field("turns", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl Drafter {
    /// New session with an empty document, saving into the working directory.
    #[must_use]
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self::build(provider, None)
    }

    /// New session saving files under `dir`.
    #[must_use]
    pub fn with_output_dir(provider: Arc<dyn ChatProvider>, dir: impl Into<PathBuf>) -> Self {
        Self::build(provider, Some(dir.into()))
    }

    fn build(provider: Arc<dyn ChatProvider>, dir: Option<PathBuf>) -> Self {
        let document = SharedDocument::default();
        let mut save_tool = SaveTool::new(Arc::clone(&document));
        if let Some(dir) = dir {
            save_tool = save_tool.with_dir(dir);
        }
        let mut tools = ToolBox::new();
        tools.add(UpdateTool::new(Arc::clone(&document)));
        tools.add(save_tool.clone());
        Self {
            provider,
            document,
            save_tool,
            tools,
            history: Vec::new(),
        }
    }

    /// Current document content.
    pub async fn document(&self) -> String {
        self.document.lock().await.clone()
    }

    /// Whether `save` has succeeded.
    pub async fn is_finished(&self) -> bool {
        self.save_tool.saved_path().await.is_some()
    }

    /// Conversation so far, without the system prompt.
    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    fn system_prompt(document: &str) -> String {
        format!(
            "You are Drafter, a helpful writing assistant. You are going to help the user update and modify documents.\n\n\
             - If the user wants to update or modify content, use the 'update' tool with the complete updated content.\n\
             - If the user wants to save and finish, you need to use the 'save' tool.\n\
             - Make sure to always show the current document state after modifications.\n\n\
             The current document content is:{document}"
        )
    }

    /// Send one user turn, then run any tools the model asks for.
    ///
    /// Tool failures are reported back to the model as tool messages rather
    /// than returned.
    ///
    /// # Errors
    ///
    /// Propagates provider failures.
    pub async fn step(&mut self, user_text: &str) -> Result<DraftTurn> {
        self.history.push(Message::user(user_text));

        let mut messages = vec![Message::system(Self::system_prompt(&self.document().await))];
        messages.extend(self.history.iter().cloned());
        let request = ChatRequest::default()
            .messages(messages)
            .tools(self.tools.definitions())
            .tool_choice(ToolChoice::Auto);

        let response = match self.provider.chat(&request).await {
            Ok(response) => response,
            Err(e) => {
                self.history.pop();
                return Err(e);
            }
        };

        let mut turn = DraftTurn {
            reply: response.text().filter(|t| !t.is_empty()).map(str::to_owned),
            ..DraftTurn::default()
        };
        let calls = response.tool_calls().to_vec();
        self.history.push(response.message);

        for call in calls {
            let name = call.function.name;
            let (output, success) = match self
                .tools
                .call(&name, Value::String(call.function.arguments))
                .await
            {
                Ok(Value::String(text)) => (text, true),
                Ok(value) => (value.to_string(), true),
                Err(e) => {
                    warn!(tool = %name, error = %e, "Tool execution failed");
                    (format!("Tool error: {e}"), false)
                }
            };
            info!(tool = %name, success, "Tool executed");
            self.history.push(Message::tool(&call.id, &name, &output));
            turn.tool_results.push(ToolOutcome {
                name,
                output,
                success,
            });
        }

        turn.saved_to = self.save_tool.saved_path().await;
        Ok(turn)
    }
}

#[cfg(test)]
mod tests {
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    use super::*;
    use crate::llms::MockProvider;
    use crate::message::ToolCall;

    #[tokio::test]
    async fn update_and_save_finish_the_session() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(MockProvider::with_messages(vec![
            Message::assistant_tool_calls(vec![ToolCall::function(
                "call_1",
                "update",
                r#"{"content": "季度报告草稿"}"#,
            )]),
            Message::assistant("文档已更新，需要保存吗？"),
            Message::assistant_tool_calls(vec![ToolCall::function(
                "call_2",
                "save",
                r#"{"filename": "report"}"#,
            )]),
        ]));
        let mut drafter = Drafter::with_output_dir(provider.clone(), dir.path());

        let turn = drafter.step(OPENING_MESSAGE).await.unwrap();
        assert_eq!(turn.tool_results.len(), 1);
        assert!(turn.tool_results[0].success);
        assert_eq!(drafter.document().await, "季度报告草稿");
        assert!(!drafter.is_finished().await);

        let turn = drafter.step("很好").await.unwrap();
        assert_eq!(turn.reply.as_deref(), Some("文档已更新，需要保存吗？"));
        assert!(turn.tool_results.is_empty());

        let turn = drafter.step("保存为 report").await.unwrap();
        let saved = dir.child("report.txt");
        assert_eq!(turn.saved_to.as_deref(), Some(saved.path()));
        assert!(drafter.is_finished().await);
        saved.assert("季度报告草稿");

        // The document reaches the model through the system prompt.
        let requests = provider.requests().await;
        assert!(requests[1].messages[0].text().unwrap_or_default().contains("季度报告草稿"));
        assert_eq!(requests[0].tools.as_ref().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn tool_errors_are_reported_to_the_model() {
        let provider = Arc::new(MockProvider::with_messages(vec![
            Message::assistant_tool_calls(vec![
                ToolCall::function("call_1", "publish", "{}"),
                ToolCall::function("call_2", "save", r#"{"filename": ""}"#),
            ]),
        ]));
        let mut drafter = Drafter::new(provider);

        let turn = drafter.step("go").await.unwrap();
        assert_eq!(turn.tool_results.len(), 2);
        assert!(turn.tool_results.iter().all(|r| !r.success));
        assert!(turn.tool_results[0].output.contains("Tool not found"));
        assert!(turn.saved_to.is_none());

        let tool_messages = drafter
            .history()
            .iter()
            .filter(|m| m.tool_call_id.is_some())
            .count();
        assert_eq!(tool_messages, 2);
    }

    #[tokio::test]
    async fn save_keeps_existing_extension() {
        let dir = TempDir::new().unwrap();
        let document = SharedDocument::default();
        *document.lock().await = "body".to_owned();
        let tool = SaveTool::new(document).with_dir(dir.path());

        let status = tool
            .call(SaveArgs {
                filename: "notes.txt".to_owned(),
            })
            .await
            .unwrap();
        assert!(status.contains("notes.txt"));
        assert!(!status.contains("notes.txt.txt"));
        dir.child("notes.txt").assert("body");
    }
}
