//! Interactive sessions built on a chat model.
//!
//! - [`AssistantSession`]: news assistant that recommends listing pages
//! - [`ChatSession`]: plain multi-turn chat with a saved transcript
//! - [`Drafter`]: tool-calling document writer

mod assistant;
mod chat;
mod drafter;

pub use assistant::{ASSISTANT_PROMPT, AssistantReply, AssistantSession};
pub use chat::{ChatSession, TRANSCRIPT_FILE, render_transcript};
pub use drafter::{DraftTurn, Drafter, OPENING_MESSAGE, SaveTool, SharedDocument, ToolOutcome, UpdateTool};
