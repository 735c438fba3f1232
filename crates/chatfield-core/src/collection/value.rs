//! The field-value accessor: a string-like proxy over a field's
//! collected base value that exposes every cast result as a named
//! attribute.
//!
//! Rust has no dynamic attribute interception, so `x.as_int` from the
//! source design becomes an explicit typed `get` plus convenience
//! sugar for the well-known default casts.

use super::field::Field;
use std::ops::Deref;

/// A read-only view over one field's collected value and casts.
///
/// Derefs to `&str`, yielding the canonical `value` string (or `""`
/// if the field hasn't been collected yet) so `&*accessor == "Kyoto"`
/// reads the way the source's string-like proxy does.
#[derive(Debug, Clone, Copy)]
pub struct FieldAccessor<'a> {
    field: &'a Field,
}

impl<'a> FieldAccessor<'a> {
    pub(crate) fn new(field: &'a Field) -> Self {
        Self { field }
    }

    /// `None` if the field has not been collected yet.
    pub fn value(&self) -> Option<&'a str> {
        self.field.value.as_deref_value()
    }

    pub fn context(&self) -> Option<&'a str> {
        self.field.value.as_ref().map(|v| v.context.as_str())
    }

    pub fn as_quote(&self) -> Option<&'a str> {
        self.field.value.as_ref().map(|v| v.as_quote.as_str())
    }

    /// Looks up an arbitrary cast result by its outward name (e.g.
    /// `"as_int"`, `"as_lang_fr"`, `"as_one_size"`).
    pub fn cast(&self, name: &str) -> Option<&'a serde_json::Value> {
        self.field.value.as_ref().and_then(|v| v.casts.get(name))
    }

    pub fn as_int(&self) -> Option<i64> {
        self.cast("as_int").and_then(|v| v.as_i64())
    }

    pub fn as_float(&self) -> Option<f64> {
        self.cast("as_float").and_then(|v| v.as_f64())
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.cast("as_bool").and_then(|v| v.as_bool())
    }

    pub fn as_percent(&self) -> Option<f64> {
        self.cast("as_percent").and_then(|v| v.as_f64())
    }

    pub fn as_str_cast(&self, name: &str) -> Option<&'a str> {
        self.cast(name).and_then(|v| v.as_str())
    }

    pub fn as_list(&self, name: &str) -> Option<Vec<serde_json::Value>> {
        self.cast(name).and_then(|v| v.as_array()).cloned()
    }

    pub fn as_dict(&self, name: &str) -> Option<&'a serde_json::Map<String, serde_json::Value>> {
        self.cast(name).and_then(|v| v.as_object())
    }

    /// Convenience for `.as_lang(code)` casts, stored under `as_lang_<code>`.
    pub fn as_lang(&self, code: &str) -> Option<&'a str> {
        self.as_str_cast(&format!("as_lang_{code}"))
    }

    /// Convenience for exactly-one choice casts, stored under `as_one_<name>`.
    pub fn as_one(&self, name: &str) -> Option<&'a str> {
        self.as_str_cast(&format!("as_one_{name}"))
    }

    /// Convenience for zero-or-one choice casts, stored under `as_maybe_<name>`.
    pub fn as_maybe(&self, name: &str) -> Option<&'a str> {
        self.as_str_cast(&format!("as_maybe_{name}"))
    }

    /// Convenience for one-or-more choice casts, stored under `as_multi_<name>`.
    pub fn as_multi(&self, name: &str) -> Option<Vec<String>> {
        self.cast(&format!("as_multi_{name}")).and_then(|v| {
            v.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
        })
    }

    /// Convenience for zero-or-more choice casts, stored under `as_any_<name>`.
    pub fn as_any(&self, name: &str) -> Option<Vec<String>> {
        self.cast(&format!("as_any_{name}")).and_then(|v| {
            v.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
        })
    }

    pub fn is_filled(&self) -> bool {
        self.field.is_filled()
    }
}

impl<'a> Deref for FieldAccessor<'a> {
    type Target = str;

    fn deref(&self) -> &str {
        self.value().unwrap_or("")
    }
}

impl<'a> std::fmt::Display for FieldAccessor<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.value().unwrap_or(""))
    }
}

impl<'a> PartialEq<&str> for FieldAccessor<'a> {
    fn eq(&self, other: &&str) -> bool {
        self.value() == Some(*other)
    }
}

trait FieldValueOptionExt {
    fn as_deref_value(&self) -> Option<&str>;
}

impl FieldValueOptionExt for Option<super::field::FieldValueRecord> {
    fn as_deref_value(&self) -> Option<&str> {
        self.as_ref().map(|v| v.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::super::field::{Cast, CastKind, FieldValueRecord};
    use super::*;
    use indexmap::IndexMap;

    fn field_with_casts() -> Field {
        let mut field = Field::new("How old are you?");
        field.casts.insert(
            "as_int".to_string(),
            Cast::new(CastKind::Int, "age as an integer"),
        );
        let mut casts = IndexMap::new();
        casts.insert("as_int".to_string(), serde_json::json!(30));
        field.set_value(FieldValueRecord {
            value: "30".to_string(),
            context: "user stated their age".to_string(),
            as_quote: "I'm 30".to_string(),
            casts,
        });
        field
    }

    #[test]
    fn unfilled_field_derefs_to_empty_string() {
        let field = Field::new("q");
        let acc = FieldAccessor::new(&field);
        assert_eq!(&*acc, "");
        assert!(!acc.is_filled());
    }

    #[test]
    fn filled_field_exposes_value_and_cast() {
        let field = field_with_casts();
        let acc = FieldAccessor::new(&field);
        assert_eq!(&*acc, "30");
        assert_eq!(acc.as_int(), Some(30));
        assert_eq!(acc.context(), Some("user stated their age"));
        assert_eq!(acc.as_quote(), Some("I'm 30"));
        assert_eq!(acc, "30");
    }

    #[test]
    fn choice_cast_convenience_accessors() {
        let mut field = Field::new("Pick a plan");
        let mut casts = IndexMap::new();
        casts.insert("as_one_plan".to_string(), serde_json::json!("pro"));
        field.set_value(FieldValueRecord {
            value: "pro".to_string(),
            context: String::new(),
            as_quote: String::new(),
            casts,
        });
        let acc = FieldAccessor::new(&field);
        assert_eq!(acc.as_one("plan"), Some("pro"));
    }
}
