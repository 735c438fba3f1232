//! The public driver façade: `go()` and
//! `end()` over one checkpointed conversation thread.

use crate::checkpoint::{Checkpointer, InMemoryCheckpointer};
use crate::config::DriverConfig;
use crate::error::{GraphError, Result};
use crate::graph::{GraphEngine, StepOutcome};
use crate::interrupt::GraphEvent;
use crate::nodes;
use crate::state::{merge_latch, merge_messages, GraphState};
use chatfield_core::Collection;
use chatfield_llm::ChatModel;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Drives one conversation thread. The Collection passed at
/// construction is shared between host and engine: after every `go()` call
/// the host observes the engine's writes through the same
/// `Arc<RwLock<Collection>>`.
pub struct Driver {
    config: DriverConfig,
    llm: Arc<dyn ChatModel>,
    checkpointer: Arc<dyn Checkpointer>,
    collection: Arc<RwLock<Collection>>,
}

impl Driver {
    /// Validates `config` and constructs a
    /// driver backed by the default in-memory checkpointer.
    pub fn new(interview: Collection, config: DriverConfig, llm: Arc<dyn ChatModel>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            collection: Arc::new(RwLock::new(interview)),
            config,
            llm,
            checkpointer: Arc::new(InMemoryCheckpointer::new()),
        })
    }

    /// Builds a driver backed by the real [`chatfield_llm::OpenAiChatModel`],
    /// constructed from `config`'s `api_key` (or the environment) and
    /// `base_url`. Prefer [`Self::new`] with an injected `llm` in tests.
    pub fn from_config(interview: Collection, config: DriverConfig) -> Result<Self> {
        config.validate()?;
        let mut client = match &config.api_key {
            Some(key) => chatfield_llm::OpenAiChatModel::new(key.clone()),
            None => chatfield_llm::OpenAiChatModel::try_from_env()?,
        };
        if let Some(base_url) = &config.base_url {
            client = client.with_base_url(base_url.clone());
        }
        Ok(Self {
            collection: Arc::new(RwLock::new(interview)),
            llm: Arc::new(client),
            checkpointer: Arc::new(InMemoryCheckpointer::new()),
            config,
        })
    }

    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn Checkpointer>) -> Self {
        self.checkpointer = checkpointer;
        self
    }

    /// The shared Collection reference. Read it after
    /// `go()` returns to see the fields it just collected.
    pub fn collection(&self) -> Arc<RwLock<Collection>> {
        self.collection.clone()
    }

    pub fn thread_id(&self) -> &str {
        &self.config.thread_id
    }

    /// Rehydrates the persisted state for this thread, merging it
    /// through the channel reducers against the host's live Collection
    /// rather than returning the checkpoint verbatim — any field the
    /// host filled directly on `self.collection` between `go()` calls
    /// still needs to be reflected in the resumed state.
    async fn load_or_initialize(&self) -> Result<GraphState> {
        let fresh = GraphState::new(self.collection.read().await.clone());
        match self.checkpointer.load(&self.config.thread_id).await? {
            Some(persisted) => Ok(GraphState {
                messages: merge_messages(persisted.messages, fresh.messages),
                interview: Collection::reduce(persisted.interview, fresh.interview),
                has_digested_confidentials: merge_latch(
                    persisted.has_digested_confidentials,
                    fresh.has_digested_confidentials,
                ),
                has_digested_concludes: merge_latch(
                    persisted.has_digested_concludes,
                    fresh.has_digested_concludes,
                ),
            }),
            None => Ok(fresh),
        }
    }

    /// `go(userInput?)`: advance one turn, returning the
    /// single interrupt value the graph produced. `None` starts the
    /// conversation; `Some(text)` resumes it with the user's utterance.
    ///
    /// Because this crate hand-builds the node loop rather than
    /// depending on a generic interrupt-yielding graph runtime, "exactly
    /// one interrupt per step" is structurally
    /// guaranteed by [`GraphEngine::run`] returning as soon as it
    /// reaches `listen` — there is no separate runtime check to make.
    pub async fn go(&self, user_input: Option<&str>) -> Result<String> {
        let mut state = self.load_or_initialize().await?;

        if let Some(input) = user_input {
            nodes::resume_with_user_input(&mut state, input);
        }

        let mut events = Vec::new();
        let engine = GraphEngine::new(self.llm.as_ref(), &self.config);
        let outcome = engine.run(&mut state, &mut events).await?;

        if let Some(interview) = state.interview.clone() {
            *self.collection.write().await = interview;
        }
        self.checkpointer.save(&self.config.thread_id, state).await?;

        let StepOutcome::Interrupt(text) = outcome;
        Ok(text)
    }

    /// Same as [`Self::go`] but also returns the observability events
    /// collected during the step.
    pub async fn go_with_events(&self, user_input: Option<&str>) -> Result<(String, Vec<GraphEvent>)> {
        let mut state = self.load_or_initialize().await?;

        if let Some(input) = user_input {
            nodes::resume_with_user_input(&mut state, input);
        }

        let mut events = Vec::new();
        let engine = GraphEngine::new(self.llm.as_ref(), &self.config);
        let outcome = engine.run(&mut state, &mut events).await?;

        if let Some(interview) = state.interview.clone() {
            *self.collection.write().await = interview;
        }
        self.checkpointer.save(&self.config.thread_id, state).await?;

        let StepOutcome::Interrupt(text) = outcome;
        Ok((text, events))
    }

    /// `end()`: `teardown` — copies final state into
    /// the host's Collection reference and exits. The engine never
    /// auto-terminates on `_done`; only this call ends
    /// a thread.
    pub async fn end(&self) -> Result<()> {
        if let Some(state) = self.checkpointer.load(&self.config.thread_id).await? {
            if let Some(interview) = state.interview {
                *self.collection.write().await = interview;
            }
        }
        Ok(())
    }
}
