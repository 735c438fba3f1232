//! Declarative conversation-data model, builder DSL, prompt synthesis
//! and tool-schema generation for chatfield.
//!
//! This crate has no knowledge of an LLM transport or a state-graph
//! runtime — those live in `chatfield-llm` and `chatfield-graph`
//! respectively. It only models *what* a conversation collects.

pub mod builder;
pub mod collection;
pub mod error;
pub mod prompt;
pub mod schema;

pub use builder::{chatfield, ChatfieldBuilder};
pub use collection::field::{Cast, CastKind, Field, FieldValueRecord, Specs, CONFIDENTIAL_NA_MARKER};
pub use collection::role::{PossibleTrait, RoleKind, RoleSpec};
pub use collection::{Collection, FieldAccessor};
pub use error::{Error, Result};
pub use prompt::PromptMode;
