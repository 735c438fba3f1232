//! The graph's nodes: `initialize`, `think`, `tools`,
//! `digest_confidentials`, `digest_concludes`, `listen`. `teardown`
//! lives in `driver.rs` since it only ever runs once, from `end()`,
//! outside the transition loop the other nodes form.

use crate::config::DriverConfig;
use crate::error::{GraphError, Result};
use crate::interrupt::GraphEvent;
use crate::state::GraphState;
use chatfield_core::collection::field::RESERVED_VALUE_KEYS;
use chatfield_core::prompt::{render, PromptMode};
use chatfield_core::{schema, Collection, FieldValueRecord};
use chatfield_llm::{ChatModel, ChatRequest, Message, Role, ToolCall};
use indexmap::IndexMap;

/// `initialize`: seeds the `interview` channel with the
/// host's Collection. Trivial enough that it is just [`GraphState::new`];
/// kept as a free function so every node the graph transitions through
/// has one matching entry in this module.
pub fn initialize(interview: Collection) -> GraphState {
    GraphState::new(interview)
}

fn interview_ref(state: &GraphState) -> Result<&Collection> {
    state
        .interview
        .as_ref()
        .ok_or_else(|| GraphError::Invariant("interview channel is empty".to_string()))
}

/// No tool schema is bound right after the system prompt is seeded or
/// right after a successful tool-result — the model must speak to the
/// user instead of immediately calling more tools.
fn should_force_speech(state: &GraphState) -> bool {
    match state.messages.last() {
        None => false,
        Some(m) if m.role == Role::System => true,
        Some(m) if m.role == Role::Tool => m.content == "Success",
        _ => false,
    }
}

/// `think`: seeds the system prompt on first entry,
/// then invokes the chat model with the update tool bound unless
/// [`should_force_speech`] says the model must speak.
pub async fn think(state: &mut GraphState, llm: &dyn ChatModel, config: &DriverConfig) -> Result<()> {
    if !state.messages.iter().any(|m| m.role == Role::System) {
        let prompt = render(interview_ref(state)?, PromptMode::Normal);
        state.messages.insert(0, Message::system(prompt));
    }

    let tools = if should_force_speech(state) {
        None
    } else {
        Some(vec![schema::update_tool_schema(interview_ref(state)?)])
    };

    let response = llm
        .complete(ChatRequest {
            messages: &state.messages,
            tools,
            model: config.model_name()?,
            temperature: config.temperature,
        })
        .await?;
    state.messages.push(response);
    Ok(())
}

fn parse_field_object(
    field_name: &str,
    value: &serde_json::Value,
) -> std::result::Result<FieldValueRecord, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| format!("field {field_name:?} payload must be an object"))?;
    let value_str = obj
        .get("value")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| format!("field {field_name:?} is missing its required 'value' key"))?
        .to_string();
    let context = obj
        .get("context")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("")
        .to_string();
    let as_quote = obj
        .get("as_quote")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("")
        .to_string();
    let mut casts = IndexMap::new();
    for (key, cast_value) in obj {
        if RESERVED_VALUE_KEYS.contains(&key.as_str()) {
            continue;
        }
        casts.insert(schema::inward_cast_name(key), cast_value.clone());
    }
    Ok(FieldValueRecord {
        value: value_str,
        context,
        as_quote,
        casts,
    })
}

/// Applies one tool call's arguments to the collection, field by
/// field. Ok on full success; Err carries a host-readable message that
/// becomes the `"Error: …"` tool-result content.
fn apply_tool_call(collection: &mut Collection, tool_call: &ToolCall) -> std::result::Result<(), String> {
    if schema::parse_tool_name(&tool_call.name, collection).is_none() {
        return Err(format!("unrecognized tool name {:?}", tool_call.name));
    }
    let args = tool_call
        .arguments
        .as_object()
        .ok_or_else(|| "tool arguments must be a JSON object".to_string())?;
    for (field_name, field_value) in args {
        if field_value.is_null() {
            continue;
        }
        let record = parse_field_object(field_name, field_value)?;
        let field = collection
            .field_mut(field_name)
            .ok_or_else(|| format!("unknown field {field_name:?}"))?;
        if field.set_value(record) {
            tracing::warn!(field = field_name, "overwriting a previously collected field value");
        }
    }
    Ok(())
}

/// `tools`: executes every tool call in the last
/// (assistant) message, appending one tool-result message per call.
pub fn tools(state: &mut GraphState, events: &mut Vec<GraphEvent>) -> Result<()> {
    let tool_calls = state
        .messages
        .last()
        .map(|m| m.tool_calls.clone())
        .unwrap_or_default();

    let mut collection = state
        .interview
        .take()
        .ok_or_else(|| GraphError::Invariant("interview channel is empty".to_string()))?;

    for call in &tool_calls {
        match apply_tool_call(&mut collection, call) {
            Ok(()) => {
                events.push(GraphEvent::ToolCallSucceeded {
                    tool_name: call.name.clone(),
                });
                state.messages.push(Message::tool_result(call.id.clone(), "Success"));
            }
            Err(err) => {
                events.push(GraphEvent::ToolCallFailed {
                    tool_name: call.name.clone(),
                    error: err.clone(),
                });
                state
                    .messages
                    .push(Message::tool_result(call.id.clone(), format!("Error: {err}")));
            }
        }
    }

    state.interview = Some(collection);
    Ok(())
}

/// `digest_confidentials`. Returns whether the digest
/// response carried tool calls — the `-> tools | think` edge depends
/// on it. If there is no unfilled confidential field, just latches the
/// flag without calling the model.
pub async fn digest_confidentials(
    state: &mut GraphState,
    llm: &dyn ChatModel,
    config: &DriverConfig,
    events: &mut Vec<GraphEvent>,
) -> Result<bool> {
    let has_work = interview_ref(state)?.unfilled_confidential_fields().next().is_some();
    if !has_work {
        state.has_digested_confidentials = true;
        events.push(GraphEvent::ConfidentialsDigested);
        return Ok(false);
    }

    let digest_prompt = render(interview_ref(state)?, PromptMode::ConfidentialDigest);
    let mut prompt_message = Message::system(digest_prompt);
    prompt_message.metadata.is_digest = true;
    state.messages.push(prompt_message);

    let tool_schema = schema::confidential_update_tool_schema(interview_ref(state)?);
    let mut response = llm
        .complete(ChatRequest {
            messages: &state.messages,
            tools: Some(vec![tool_schema]),
            model: config.model_name()?,
            temperature: config.temperature,
        })
        .await?;
    let had_tool_calls = response.has_tool_calls();
    response.metadata.is_digest = true;
    state.messages.push(response);
    state.has_digested_confidentials = true;
    events.push(GraphEvent::ConfidentialsDigested);
    Ok(had_tool_calls)
}

/// `digest_concludes`. Unconditional on whether the
/// collection has any `conclude` fields at all: one with none is the
/// degenerate case and just latches the flag.
pub async fn digest_concludes(
    state: &mut GraphState,
    llm: &dyn ChatModel,
    config: &DriverConfig,
    events: &mut Vec<GraphEvent>,
) -> Result<bool> {
    let has_conclude_fields = interview_ref(state)?.conclude_fields().next().is_some();
    if !has_conclude_fields {
        state.has_digested_concludes = true;
        events.push(GraphEvent::ConcludesDigested);
        return Ok(false);
    }

    let digest_prompt = render(interview_ref(state)?, PromptMode::ConcludeDigest);
    let mut prompt_message = Message::system(digest_prompt);
    prompt_message.metadata.is_digest = true;
    state.messages.push(prompt_message);

    let tool_schema = schema::conclude_tool_schema(interview_ref(state)?);
    let mut response = llm
        .complete(ChatRequest {
            messages: &state.messages,
            tools: Some(vec![tool_schema]),
            model: config.model_name()?,
            temperature: config.temperature,
        })
        .await?;
    let had_tool_calls = response.has_tool_calls();
    response.metadata.is_digest = true;
    state.messages.push(response);
    state.has_digested_concludes = true;
    events.push(GraphEvent::ConcludesDigested);
    Ok(had_tool_calls)
}

/// `listen`: the last message must be an assistant
/// message; returns its stripped text as the interrupt value.
pub fn listen(state: &GraphState) -> Result<String> {
    let last = state
        .messages
        .last()
        .ok_or_else(|| GraphError::Invariant("listen reached with no messages".to_string()))?;
    if last.role != Role::Assistant {
        return Err(GraphError::Invariant(
            "listen reached but the last message is not an assistant message".to_string(),
        ));
    }
    Ok(last.content.trim().to_string())
}

/// Applies the resume payload `{user_input}`: it becomes
/// a user message, continuing the conversation at `think`.
pub fn resume_with_user_input(state: &mut GraphState, user_input: &str) {
    state.messages.push(Message::user(user_input.to_string()));
}
