//! Observability events emitted while the graph runs a step — additive
//! instrumentation, never required to interpret the conversation.

use chatfield_core::RoleKind;

/// One notable thing that happened during a [`crate::graph::GraphEngine`]
/// step. Collected into a `Vec<GraphEvent>` and handed back to the
/// host alongside the interrupt value so a caller can log or display
/// them without re-deriving them from the message transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    ToolCallSucceeded { tool_name: String },
    ToolCallFailed { tool_name: String, error: String },
    /// A role's possible trait was activated.
    /// Not currently driven by a dedicated tool channel — reserved for
    /// when one is added — but kept here so callers can match on it
    /// without a breaking change later.
    TraitActivated { role: RoleKind, trait_name: String },
    ConfidentialsDigested,
    ConcludesDigested,
}
