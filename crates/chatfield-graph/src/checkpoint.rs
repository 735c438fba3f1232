//! The checkpointer boundary. We build our own minimal
//! purpose-built primitive rather than depend on a generic external
//! graph-runtime crate, with an async load/save shape that a durable
//! backend (a database, a file, a distributed cache) can implement
//! without touching the engine.

use crate::error::Result;
use crate::state::GraphState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persists [`GraphState`] keyed by `thread_id`. The driver calls
/// `load` at the start of `go()` and `save` after every step.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    async fn load(&self, thread_id: &str) -> Result<Option<GraphState>>;
    async fn save(&self, thread_id: &str, state: GraphState) -> Result<()>;
}

/// The default checkpointer: an in-process map, good for tests and
/// single-process hosts. Nothing here survives a process restart.
#[derive(Default)]
pub struct InMemoryCheckpointer {
    states: Arc<RwLock<HashMap<String, GraphState>>>,
}

impl InMemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Checkpointer for InMemoryCheckpointer {
    async fn load(&self, thread_id: &str) -> Result<Option<GraphState>> {
        Ok(self.states.read().await.get(thread_id).cloned())
    }

    async fn save(&self, thread_id: &str, state: GraphState) -> Result<()> {
        self.states
            .write()
            .await
            .insert(thread_id.to_string(), state);
        Ok(())
    }
}
