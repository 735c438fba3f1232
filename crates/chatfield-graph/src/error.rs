//! Error types for the chatfield-graph crate.

use thiserror::Error;

/// Errors raised by the orchestrator and the public driver.
#[derive(Error, Debug, Clone)]
pub enum GraphError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("orchestrator invariant violated: {0}")]
    Invariant(String),

    #[error("chat model error: {0}")]
    ChatModel(#[from] chatfield_llm::ChatModelError),

    #[error("checkpointer error: {0}")]
    Checkpoint(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
