//! Role domain model: Alice (assistant) and Bob (user), their display
//! type, unconditional traits, and conditionally-activatable traits.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which side of the conversation a [`RoleSpec`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleKind {
    /// The assistant role.
    Alice,
    /// The user role.
    Bob,
}

impl RoleKind {
    pub fn default_type(self) -> &'static str {
        match self {
            RoleKind::Alice => "Agent",
            RoleKind::Bob => "User",
        }
    }
}

/// A role trait that starts inactive and may be activated by the LLM
/// based on conversational evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossibleTrait {
    pub description: String,
    #[serde(default)]
    pub active: bool,
}

impl PossibleTrait {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            active: false,
        }
    }

    /// Activates the trait. Transitions false -> true at most once;
    /// activating an already-active trait is a no-op, not an error.
    pub fn activate(&mut self) -> bool {
        if self.active {
            false
        } else {
            self.active = true;
            true
        }
    }
}

/// One side of the conversation: its display type, unconditional
/// traits, and possible (conditionally-activatable) traits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub kind: RoleKind,
    #[serde(rename = "type")]
    pub type_name: String,
    pub traits: Vec<String>,
    pub possible_traits: IndexMap<String, PossibleTrait>,
}

impl RoleSpec {
    pub fn new(kind: RoleKind) -> Self {
        Self {
            type_name: kind.default_type().to_string(),
            kind,
            traits: Vec::new(),
            possible_traits: IndexMap::new(),
        }
    }

    /// True once this role's display type has been customized away from
    /// its default — used by the merge change-detector.
    pub fn has_custom_type(&self) -> bool {
        self.type_name != self.kind.default_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_role_has_default_type_and_no_traits() {
        let alice = RoleSpec::new(RoleKind::Alice);
        assert_eq!(alice.type_name, "Agent");
        assert!(!alice.has_custom_type());
        assert!(alice.traits.is_empty());
        assert!(alice.possible_traits.is_empty());
    }

    #[test]
    fn possible_trait_activates_once() {
        let mut t = PossibleTrait::new("gets excited about trains");
        assert!(!t.active);
        assert!(t.activate());
        assert!(t.active);
        assert!(!t.activate());
    }
}
