//! The bounded executor loop that drives [`GraphState`] through the
//! node transition table, stopping at `listen` (the conversation's
//! sole suspension point).

use crate::config::DriverConfig;
use crate::error::{GraphError, Result};
use crate::interrupt::GraphEvent;
use crate::nodes;
use crate::state::GraphState;
use chatfield_llm::ChatModel;

/// A guard against a routing bug turning into an infinite loop: no legitimate conversation needs this many node
/// transitions between two `listen` suspensions.
const MAX_TRANSITIONS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Think,
    Tools,
    DigestConfidentials,
    DigestConcludes,
}

/// What one call to [`GraphEngine::run`] produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The graph suspended at `listen` with this assistant utterance.
    Interrupt(String),
}

/// Runs the node loop against one injected chat model and
/// configuration. Stateless itself — all mutation happens on the
/// [`GraphState`] passed to [`Self::run`].
pub struct GraphEngine<'a> {
    llm: &'a dyn ChatModel,
    config: &'a DriverConfig,
}

impl<'a> GraphEngine<'a> {
    pub fn new(llm: &'a dyn ChatModel, config: &'a DriverConfig) -> Self {
        Self { llm, config }
    }

    /// Advances `state` from `think` until the graph reaches `listen`.
    pub async fn run(&self, state: &mut GraphState, events: &mut Vec<GraphEvent>) -> Result<StepOutcome> {
        let mut node = Node::Think;
        for _ in 0..MAX_TRANSITIONS {
            node = match node {
                Node::Think => {
                    nodes::think(state, self.llm, self.config).await?;
                    let last_had_tool_calls = state
                        .messages
                        .last()
                        .map(|m| m.has_tool_calls())
                        .unwrap_or(false);
                    if last_had_tool_calls {
                        Node::Tools
                    } else {
                        return Ok(StepOutcome::Interrupt(nodes::listen(state)?));
                    }
                }
                Node::Tools => {
                    nodes::tools(state, events)?;
                    let interview = state
                        .interview
                        .as_ref()
                        .ok_or_else(|| GraphError::Invariant("interview channel is empty".to_string()))?;
                    if interview.is_enough() && !state.has_digested_confidentials {
                        Node::DigestConfidentials
                    } else if interview.is_enough() && !state.has_digested_concludes {
                        Node::DigestConcludes
                    } else {
                        Node::Think
                    }
                }
                Node::DigestConfidentials => {
                    let had_tool_calls =
                        nodes::digest_confidentials(state, self.llm, self.config, events).await?;
                    if had_tool_calls {
                        Node::Tools
                    } else {
                        Node::Think
                    }
                }
                Node::DigestConcludes => {
                    let had_tool_calls =
                        nodes::digest_concludes(state, self.llm, self.config, events).await?;
                    if had_tool_calls {
                        Node::Tools
                    } else {
                        Node::Think
                    }
                }
            };
        }
        Err(GraphError::Invariant(
            "exceeded the maximum number of node transitions without reaching listen".to_string(),
        ))
    }
}
