//! The `ChatModel` trait: the external "chat transport" collaborator —
//! accepts messages and an optional tool schema, returns either an
//! assistant message or tool-call invocations.
//!
//! One async `execute`-style method behind a trait object, so the
//! orchestrator never depends on a concrete backend.

use crate::message::Message;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ChatModelError {
    #[error("chat model transport error: {0}")]
    Transport(String),

    #[error("chat model returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("chat model configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, ChatModelError>;

/// One request to the chat model: the full message history plus an
/// optional bound tool schema. No tool schema bound means the model
/// must speak to the user rather than call a tool.
#[derive(Debug, Clone)]
pub struct ChatRequest<'a> {
    pub messages: &'a [Message],
    pub tools: Option<Vec<serde_json::Value>>,
    pub model: &'a str,
    pub temperature: Option<f32>,
}

/// The external chat-model collaborator. Implementations own their
/// own HTTP/transport details; the orchestrator only ever calls
/// `complete`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<Message>;
}
