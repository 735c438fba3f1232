//! A deterministic `ChatModel` test double: returns a pre-scripted
//! sequence of responses, one per call, recording every request it
//! received. Used to drive end-to-end conversation scenarios in tests.

use crate::chat_model::{ChatModel, ChatModelError, ChatRequest, Result};
use crate::message::Message;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// Records the message history and bound-tool presence for one
/// `complete` call, so tests can assert on what the orchestrator sent.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub had_tools: bool,
}

pub struct ScriptedChatModel {
    responses: Mutex<VecDeque<Message>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedChatModel {
    pub fn new(responses: impl IntoIterator<Item = Message>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn remaining(&self) -> usize {
        self.responses.lock().await.len()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<Message> {
        self.requests.lock().await.push(RecordedRequest {
            messages: request.messages.to_vec(),
            had_tools: request.tools.is_some(),
        });
        self.responses
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| ChatModelError::Transport("scripted responses exhausted".to_string()))
    }
}
