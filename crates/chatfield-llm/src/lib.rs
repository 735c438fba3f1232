//! The external "chat model" collaborator boundary: an
//! LLM transport accepting messages and an optional tool schema,
//! returning an assistant message or tool-call invocations. This
//! crate defines that boundary and ships two implementations: a real
//! OpenAI-compatible client, and a scripted test double.

pub mod chat_model;
pub mod message;
pub mod openai;
pub mod scripted;

pub use chat_model::{ChatModel, ChatModelError, ChatRequest};
pub use message::{Message, MessageMetadata, Role, ToolCall};
pub use openai::OpenAiChatModel;
pub use scripted::{RecordedRequest, ScriptedChatModel};
