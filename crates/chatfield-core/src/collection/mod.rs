//! The declarative conversation-data model: [`Collection`], its two
//! [`role::RoleSpec`]s, and its ordered [`field::Field`] map.

pub mod field;
pub mod role;
pub mod value;

use crate::error::{Error, Result};
use field::Field;
use indexmap::IndexMap;
use role::{RoleKind, RoleSpec};
use serde::{Deserialize, Serialize};

pub use field::{Cast, CastKind, FieldValueRecord, Specs, CONFIDENTIAL_NA_MARKER};
pub use role::PossibleTrait;
pub use value::FieldAccessor;

/// Hard limit on `Collection::type_name` length.
pub const TYPE_NAME_MAX_LEN: usize = 64;

/// The declarative root object describing one conversation's data
/// model — sometimes called an "interview" in the source family this
/// design is grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "type")]
    pub type_name: String,
    pub desc: Option<String>,
    pub alice: RoleSpec,
    pub bob: RoleSpec,
    pub fields: IndexMap<String, Field>,
}

impl Collection {
    pub(crate) fn new(type_name: String) -> Self {
        Self {
            type_name,
            desc: None,
            alice: RoleSpec::new(RoleKind::Alice),
            bob: RoleSpec::new(RoleKind::Bob),
            fields: IndexMap::new(),
        }
    }

    /// A short, stable identifier derived from the collection, used as
    /// the tool-name suffix (`update_<id>`, `conclude_<id>`, …).
    pub fn id(&self) -> String {
        let mut id: String = self
            .type_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        if id.is_empty() {
            id = "collection".to_string();
        }
        id
    }

    pub fn role(&self, kind: RoleKind) -> &RoleSpec {
        match kind {
            RoleKind::Alice => &self.alice,
            RoleKind::Bob => &self.bob,
        }
    }

    fn role_mut(&mut self, kind: RoleKind) -> &mut RoleSpec {
        match kind {
            RoleKind::Alice => &mut self.alice,
            RoleKind::Bob => &mut self.bob,
        }
    }

    /// `_enough`: every non-conclude field has a value.
    pub fn is_enough(&self) -> bool {
        self.fields
            .values()
            .filter(|f| !f.specs.is_conclude())
            .all(Field::is_filled)
    }

    /// `_done`: every field, including conclude fields,
    /// has a value.
    pub fn is_done(&self) -> bool {
        self.fields.values().all(Field::is_filled)
    }

    /// Master fields: non-conclude fields, in declaration order.
    pub fn master_fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields
            .iter()
            .filter(|(_, f)| !f.specs.is_conclude())
            .map(|(n, f)| (n.as_str(), f))
    }

    /// Conclude fields, in declaration order.
    pub fn conclude_fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields
            .iter()
            .filter(|(_, f)| f.specs.is_conclude())
            .map(|(n, f)| (n.as_str(), f))
    }

    /// Confidential (non-conclude) fields still unfilled — the set the
    /// confidential-digest tool schema must force to N/A.
    pub fn unfilled_confidential_fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields
            .iter()
            .filter(|(_, f)| f.specs.is_confidential_only() && !f.is_filled())
            .map(|(n, f)| (n.as_str(), f))
    }

    pub fn field(&self, name: &str) -> Option<FieldAccessor<'_>> {
        self.fields.get(name).map(FieldAccessor::new)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.get_mut(name)
    }

    /// Validates field/cast-name uniqueness. `IndexMap` already
    /// guarantees field-name uniqueness by construction (a repeated
    /// `.field(name)` call just re-selects the same entry), so this
    /// only needs to check cast names within each field.
    pub fn validate(&self) -> Result<()> {
        if self.type_name.chars().count() > TYPE_NAME_MAX_LEN {
            return Err(Error::TypeNameTooLong(self.type_name.clone()));
        }
        for (name, field) in &self.fields {
            field.validate_cast_names(name)?;
            for (cast_name, cast) in &field.casts {
                if let CastKind::Choice { choices,.. } = &cast.kind {
                    if choices.is_empty() {
                        return Err(Error::EmptyChoices {
                            field: name.clone(),
                            cast: cast_name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Computes the merge "change signal" between `self` (existing,
    /// `a`) and `other` (incoming, `b`): true if any field transitions
    /// null->non-null, any role type changes from default to custom, or
    /// any traits list differs.
    pub fn changed_from(&self, other: &Collection) -> bool {
        for (name, new_field) in &other.fields {
            let was_filled = self.fields.get(name).map(Field::is_filled).unwrap_or(false);
            if !was_filled && new_field.is_filled() {
                return true;
            }
        }
        for kind in [RoleKind::Alice, RoleKind::Bob] {
            let a = self.role(kind);
            let b = other.role(kind);
            if a.has_custom_type() != b.has_custom_type() || a.type_name != b.type_name {
                return true;
            }
            if a.traits != b.traits {
                return true;
            }
            if a.possible_traits != b.possible_traits {
                return true;
            }
        }
        false
    }

    /// The `interview` channel reducer: writer-wins
    /// after change detection, not a deep merge.
    pub fn reduce(a: Option<Collection>, b: Option<Collection>) -> Option<Collection> {
        match (a, b) {
            (None, b) => b,
            (a, None) => a,
            (Some(a), Some(b)) => {
                if a.changed_from(&b) {
                    Some(b)
                } else {
                    Some(a)
                }
            }
        }
    }
}

impl std::ops::Index<&str> for Collection {
    type Output = Field;

    /// Bracket-style access, so field names containing punctuation
    /// (PDF-form-style identifiers) can be read without a Rust
    /// identifier colliding with them.
    fn index(&self, name: &str) -> &Field {
        self.fields
            .get(name)
            .unwrap_or_else(|| panic!("no such field: {name:?}"))
    }
}
