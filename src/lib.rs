//! Chatfield: LLM-driven conversational data collection.
//!
//! An application declares a [`Collection`] — a named set of fields
//! with descriptions, validation predicates, and type-coercion
//! requests — via the fluent [`chatfield()`] builder, hands it to a
//! [`Driver`], and drives the conversation one turn at a time with
//! [`Driver::go`]. When the driver determines the data is complete,
//! the host reads typed values back off the same `Collection` through
//! [`FieldAccessor`].
//!
//! This crate is a thin façade over three crates that can be depended
//! on individually:
//!
//! - [`chatfield_core`] — the declarative model, builder, prompt
//!   synthesis and tool-schema generation. No knowledge of an LLM
//!   transport or a state graph.
//! - [`chatfield_llm`] — the [`ChatModel`] transport boundary, an
//!   OpenAI-compatible implementation, and a scripted test double.
//! - [`chatfield_graph`] — the conversation finite-state graph and the
//!   public [`Driver`].

pub use chatfield_core::{
    chatfield, Cast, CastKind, ChatfieldBuilder, Collection, Error as CollectionError, Field,
    FieldAccessor, FieldValueRecord, PossibleTrait, PromptMode, Result as CollectionResult,
    RoleKind, RoleSpec, Specs, CONFIDENTIAL_NA_MARKER,
};
pub use chatfield_llm::{
    ChatModel, ChatModelError, ChatRequest, Message, MessageMetadata, OpenAiChatModel,
    RecordedRequest, Role, ScriptedChatModel, ToolCall,
};
pub use chatfield_graph::{
    Checkpointer, Driver, DriverConfig, EndpointSecurity, GraphError, GraphEvent, GraphState,
    HostEnvironment, InMemoryCheckpointer, Result as GraphResult,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn end_to_end_single_field_collection() {
        let collection = chatfield()
            .type_name("Trip")
            .field("destination")
            .desc("Where to?")
            .build()
            .unwrap();

        let llm = Arc::new(ScriptedChatModel::new(vec![Message::assistant("Where to?")]));
        let driver = Driver::new(collection, DriverConfig::new(), llm).unwrap();

        let reply = driver.go(None).await.unwrap();
        assert_eq!(reply, "Where to?");

        let shared = driver.collection();
        let snapshot = shared.read().await;
        assert!(!snapshot.is_done());
    }
}
