//! Field domain model: specs, casts and the collected value record.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Base keys that always appear in a collected [`FieldValueRecord`] and
/// that a cast name may never shadow.
pub const RESERVED_VALUE_KEYS: [&str; 3] = ["value", "context", "as_quote"];

/// The primitive shape an LLM-computed cast coerces its input into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CastKind {
    Int,
    Float,
    Str,
    Bool,
    List,
    Set,
    Dict,
    /// A choice cast. Cardinality is carried explicitly rather than as a
    /// separate enum so schema generation (chatfield-core::schema) can
    /// read `multi`/`nullable` directly off the cast.
    Choice {
        choices: Vec<String>,
        multi: bool,
        nullable: bool,
    },
}

impl CastKind {
    /// The outward cast-name prefix a builder method of this kind implies,
    /// for choice casts. Used to build default cast names like `as_one_size`.
    pub fn choice_prefix(multi: bool, nullable: bool) -> &'static str {
        match (multi, nullable) {
            (false, false) => "as_one",
            (false, true) => "as_maybe",
            (true, false) => "as_multi",
            (true, true) => "as_any",
        }
    }
}

/// A single named, LLM-computed derivation requested on a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cast {
    pub kind: CastKind,
    /// Natural-language instruction shown to the LLM for this cast. For
    /// choice casts, `{name}` is interpolated with the field name when
    /// the tool schema is rendered.
    pub prompt: String,
}

impl Cast {
    pub fn new(kind: CastKind, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
        }
    }
}

/// Validation/guidance predicates and scheduling flags on a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Specs {
    pub must: Vec<String>,
    pub reject: Vec<String>,
    pub hint: Vec<String>,
    pub confidential: bool,
    pub conclude: bool,
}

impl Specs {
    /// A field marked both `confidential` and `conclude` is scheduled as
    /// `conclude`: conclude dominates.
    pub fn is_conclude(&self) -> bool {
        self.conclude
    }

    pub fn is_confidential_only(&self) -> bool {
        self.confidential && !self.conclude
    }
}

/// Sentinel used for confidential fields the user never volunteered,
/// written by the confidential-digest step.
pub const CONFIDENTIAL_NA_MARKER: &str = "N/A";

/// The collected value of a field, once an LLM tool call has populated it.
///
/// `value`, `context` and `as_quote` are always present;
/// every other key is the outward name of a cast (e.g. `as_int`,
/// `as_lang_fr`, `as_one_size`) mapped to its coerced JSON result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValueRecord {
    pub value: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub as_quote: String,
    #[serde(default)]
    pub casts: IndexMap<String, serde_json::Value>,
}

impl FieldValueRecord {
    pub fn na() -> Self {
        Self {
            value: CONFIDENTIAL_NA_MARKER.to_string(),
            context: String::new(),
            as_quote: String::new(),
            casts: IndexMap::new(),
        }
    }
}

/// A single field in a [`crate::Collection`]: a natural-language question
/// plus the specs and casts that govern how it is solicited, validated
/// and coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub desc: String,
    pub specs: Specs,
    pub casts: IndexMap<String, Cast>,
    pub value: Option<FieldValueRecord>,
}

impl Field {
    pub fn new(desc: impl Into<String>) -> Self {
        Self {
            desc: desc.into(),
            specs: Specs::default(),
            casts: IndexMap::new(),
            value: None,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.value.is_some()
    }

    /// Inserts `value` as this field's collected value. Returns `true`
    /// if this was an overwrite of a previously-collected value — the
    /// caller is responsible for logging that.
    pub fn set_value(&mut self, value: FieldValueRecord) -> bool {
        let overwrite = self.value.is_some();
        self.value = Some(value);
        overwrite
    }

    /// Validates that every cast name is unique and does not collide
    /// with a reserved base key. Called from `Collection::validate`.
    pub fn validate_cast_names(&self, field_name: &str) -> crate::error::Result<()> {
        for cast_name in self.casts.keys() {
            if RESERVED_VALUE_KEYS.contains(&cast_name.as_str()) {
                return Err(crate::error::Error::ReservedCastName {
                    field: field_name.to_string(),
                    cast: cast_name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_field_has_no_value_and_empty_specs() {
        let f = Field::new("Where to?");
        assert!(f.value.is_none());
        assert!(f.specs.must.is_empty());
        assert!(f.specs.reject.is_empty());
        assert!(f.specs.hint.is_empty());
    }

    #[test]
    fn set_value_reports_overwrite() {
        let mut f = Field::new("q");
        assert!(!f.set_value(FieldValueRecord {
            value: "a".into(),
            context: String::new(),
            as_quote: String::new(),
            casts: IndexMap::new(),
        }));
        assert!(f.set_value(FieldValueRecord {
            value: "b".into(),
            context: String::new(),
            as_quote: String::new(),
            casts: IndexMap::new(),
        }));
    }

    #[test]
    fn reserved_cast_name_is_rejected() {
        let mut f = Field::new("q");
        f.casts.insert(
            "context".to_string(),
            Cast::new(CastKind::Str, "shouldn't be allowed"),
        );
        assert!(f.validate_cast_names("q").is_err());
    }

    #[test]
    fn conclude_dominates_confidential() {
        let mut specs = Specs::default();
        specs.confidential = true;
        specs.conclude = true;
        assert!(specs.is_conclude());
        assert!(!specs.is_confidential_only());
    }
}
