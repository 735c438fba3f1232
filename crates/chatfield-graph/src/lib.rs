//! The conversation finite-state graph:
//! nodes, checkpointed resumption, merge/reduction semantics, and the
//! public [`driver::Driver`] façade.
//!
//! This crate owns no LLM transport of its own and no state-graph
//! runtime primitives beyond the minimal ones it needs. It depends on
//! `chatfield-core` for the declarative model, prompt synthesis and
//! schema generation, and on `chatfield-llm` for the `ChatModel`
//! boundary and message type.

pub mod checkpoint;
pub mod config;
pub mod driver;
pub mod error;
pub mod graph;
pub mod interrupt;
pub mod nodes;
pub mod state;

pub use checkpoint::{Checkpointer, InMemoryCheckpointer};
pub use config::{DriverConfig, EndpointSecurity, HostEnvironment};
pub use driver::Driver;
pub use error::{GraphError, Result};
pub use graph::{GraphEngine, StepOutcome};
pub use interrupt::GraphEvent;
pub use state::GraphState;
