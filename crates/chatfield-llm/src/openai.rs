//! An OpenAI-compatible `ChatModel`: a direct REST client against the
//! Chat Completions API, configurable by environment variable fallback.

use crate::chat_model::{ChatModel, ChatModelError, ChatRequest, Result};
use crate::message::{Message, Role, ToolCall};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Chat-completions client against an OpenAI-compatible endpoint.
pub struct OpenAiChatModel {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiChatModel {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("reqwest client builds"),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Loads the API key from `OPENAI_API_KEY` when no explicit key was
    /// configured.
    pub fn try_from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            ChatModelError::Configuration("OPENAI_API_KEY not set in environment".to_string())
        })?;
        Ok(Self::new(api_key))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

fn to_wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

fn to_wire_message(message: &Message) -> WireMessage {
    let tool_calls = if message.has_tool_calls() {
        Some(
            message
                .tool_calls
                .iter()
                .map(|tc| WireToolCall {
                    id: tc.id.clone(),
                    kind: "function".to_string(),
                    function: WireFunctionCall {
                        name: tc.name.clone(),
                        arguments: tc.arguments.to_string(),
                    },
                })
                .collect(),
        )
    } else {
        None
    };
    WireMessage {
        role: to_wire_role(message.role),
        content: if message.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(message.content.clone())
        },
        tool_call_id: message.metadata.tool_call_id.clone(),
        tool_calls,
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<Message> {
        tracing::debug!(
            model = request.model,
            messages = request.messages.len(),
            has_tools = request.tools.is_some(),
            "sending chat completion request"
        );
        let body = ChatCompletionRequest {
            model: request.model.to_string(),
            messages: request.messages.iter().map(to_wire_message).collect(),
            tools: request.tools.map(|tools| {
                tools
                    .into_iter()
                    .map(|schema| WireTool {
                        kind: "function",
                        function: schema,
                    })
                    .collect()
            }),
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatModelError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "chat completion request failed");
            return Err(ChatModelError::Transport(format!(
                "OpenAI API returned {status}: {text}"
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatModelError::MalformedResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatModelError::MalformedResponse("no choices in response".to_string()))?;

        if !choice.message.tool_calls.is_empty() {
            let tool_calls = choice
                .message
                .tool_calls
                .into_iter()
                .map(|tc| {
                    let arguments = serde_json::from_str(&tc.function.arguments)
                        .unwrap_or(serde_json::Value::Null);
                    ToolCall {
                        id: tc.id,
                        name: tc.function.name,
                        arguments,
                    }
                })
                .collect();
            Ok(Message::assistant_with_tool_calls(
                choice.message.content.unwrap_or_default(),
                tool_calls,
            ))
        } else {
            Ok(Message::assistant(choice.message.content.unwrap_or_default()))
        }
    }
}
