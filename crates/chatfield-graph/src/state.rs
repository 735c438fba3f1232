//! The graph's per-thread state object and its channel reducers.

use chatfield_core::Collection;
use chatfield_llm::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One conversation thread's state. Persisted by a [`crate::checkpoint::Checkpointer`]
/// keyed by `thread_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphState {
    pub messages: Vec<Message>,
    pub interview: Option<Collection>,
    pub has_digested_confidentials: bool,
    pub has_digested_concludes: bool,
}

impl GraphState {
    /// `initialize`: seeds the `interview` channel with
    /// the host's Collection.
    pub fn new(interview: Collection) -> Self {
        Self {
            messages: Vec::new(),
            interview: Some(interview),
            has_digested_confidentials: false,
            has_digested_concludes: false,
        }
    }
}

/// The `messages` channel reducer: append-with-dedup-by-id. `a` is the existing sequence, `b` the incoming one.
pub fn merge_messages(a: Vec<Message>, b: Vec<Message>) -> Vec<Message> {
    let seen: HashSet<&str> = a.iter().map(|m| m.id.as_str()).collect();
    let mut merged = a.clone();
    for message in b {
        if !seen.contains(message.id.as_str()) {
            merged.push(message);
        }
    }
    merged
}

/// The digest-flag channel reducer: logical-OR, i.e. latching.
pub fn merge_latch(a: bool, b: bool) -> bool {
    a || b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str) -> Message {
        let mut m = Message::user("hi");
        m.id = id.to_string();
        m
    }

    #[test]
    fn merge_messages_appends_without_duplicating_ids() {
        let a = vec![msg("1"), msg("2")];
        let b = vec![msg("2"), msg("3")];
        let merged = merge_messages(a, b);
        let ids: Vec<&str> = merged.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn merge_latch_is_monotonic() {
        assert!(merge_latch(true, false));
        assert!(merge_latch(false, true));
        assert!(!merge_latch(false, false));
        assert!(merge_latch(true, true));
    }
}
