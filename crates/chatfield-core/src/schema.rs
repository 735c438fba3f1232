//! Dynamic tool-schema generation.
//!
//! Given a [`Collection`], this module emits the JSON Schemas bound to
//! the external chat-model collaborator as structured-output tools:
//! the *update* tool (every non-conclude field, optional+nullable),
//! the *conclude* tool (every conclude field, mandatory), and the
//! *confidential-update* tool (built per-invocation from whichever
//! confidential fields are still unfilled).
//!
//! Schemas are plain `serde_json::Value` trees — the field set is
//! only known at runtime from the declarative [`Collection`], so a
//! compile-time derive (e.g. `schemars`) cannot describe it; the shape
//! is assembled by hand, one JSON Schema fragment per cast kind.

use crate::collection::field::{Cast, CastKind, Field};
use crate::collection::Collection;
use serde_json::{json, Value};

/// Outward prefix translation for choice casts: the
/// internal `as_one_`/`as_maybe_`/`as_multi_`/`as_any_` prefix is
/// never shown to the LLM. Centralized here and in
/// [`outward_to_inward_choice_prefix`] so the two directions can't
/// drift apart.
pub fn inward_to_outward_choice_prefix(inward: &str) -> &'static str {
    match inward {
        "as_one" => "choose_exactly_one",
        "as_maybe" => "choose_zero_or_one",
        "as_multi" => "choose_one_or_more",
        "as_any" => "choose_zero_or_more",
        other => panic!("not a choice-cast prefix: {other:?}"),
    }
}

pub fn outward_to_inward_choice_prefix(outward: &str) -> Option<&'static str> {
    match outward {
        "choose_exactly_one" => Some("as_one"),
        "choose_zero_or_one" => Some("as_maybe"),
        "choose_one_or_more" => Some("as_multi"),
        "choose_zero_or_more" => Some("as_any"),
        _ => None,
    }
}

/// Splits an inward cast name like `as_one_size` into
/// `(outward_name, suffix)` = `("choose_exactly_one_size", "size")` if
/// it is a choice cast, else `None`.
fn outward_cast_name(inward_name: &str, kind: &CastKind) -> String {
    if let CastKind::Choice {.. } = kind {
        for prefix in ["as_one", "as_maybe", "as_multi", "as_any"] {
            if let Some(suffix) = inward_name.strip_prefix(&format!("{prefix}_")) {
                return format!("{}_{}", inward_to_outward_choice_prefix(prefix), suffix);
            }
        }
    }
    inward_name.to_string()
}

/// Given an outward cast name as returned by the LLM, recovers the
/// inward storage name.
pub fn inward_cast_name(outward_name: &str) -> String {
    for outward_prefix in [
        "choose_exactly_one",
        "choose_zero_or_one",
        "choose_one_or_more",
        "choose_zero_or_more",
    ] {
        if let Some(suffix) = outward_name.strip_prefix(&format!("{outward_prefix}_")) {
            let inward_prefix = outward_to_inward_choice_prefix(outward_prefix).unwrap();
            return format!("{inward_prefix}_{suffix}");
        }
    }
    outward_name.to_string()
}

fn cast_schema(field_name: &str, cast_name: &str, cast: &Cast) -> Value {
    let description = cast.prompt.replace("{name}", field_name);
    match &cast.kind {
        CastKind::Int => json!({ "type": "integer", "description": description }),
        CastKind::Float => json!({ "type": "number", "description": description }),
        CastKind::Str => json!({ "type": "string", "description": description }),
        CastKind::Bool => json!({ "type": "boolean", "description": description }),
        CastKind::List => json!({ "type": "array", "items": {}, "description": description }),
        CastKind::Set => json!({ "type": "array", "items": {}, "description": description }),
        CastKind::Dict => json!({
            "type": "object",
            "additionalProperties": true,
            "description": description,
        }),
        CastKind::Choice {
            choices,
            multi,
            nullable,
        } => choice_schema(choices, *multi, *nullable, &description, cast_name),
    }
}

fn choice_schema(choices: &[String], multi: bool, nullable: bool, description: &str, _cast_name: &str) -> Value {
    let enum_schema = json!({ "type": "string", "enum": choices });
    match (multi, nullable) {
        (false, false) => {
            let mut schema = enum_schema;
            schema["description"] = json!(description);
            schema
        }
        (false, true) => json!({
            "anyOf": [enum_schema, { "type": "null" }],
            "description": description,
        }),
        (true, false) => json!({
            "type": "array",
            "items": enum_schema,
            "minItems": 1,
            "maxItems": choices.len(),
            "description": description,
        }),
        (true, true) => json!({
            "anyOf": [
                {
                    "type": "array",
                    "items": enum_schema,
                    "minItems": 0,
                    "maxItems": choices.len(),
                },
                { "type": "null" },
            ],
            "description": description,
        }),
    }
}

/// Builds the nested object schema for one field: `{value, …casts}`.
fn field_object_schema(field_name: &str, field: &Field, collection_type: &str) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        "value".to_string(),
        json!({
            "type": "string",
            "description": format!(
                "The most typical valid representation of a {collection_type} {field_name}"
            ),
        }),
    );
    properties.insert(
        "context".to_string(),
        json!({
            "type": "string",
            "description": "A short summary of the surrounding conversation that led to this value.",
        }),
    );
    properties.insert(
        "as_quote".to_string(),
        json!({
            "type": "string",
            "description": "The verbatim user utterance that yielded this value.",
        }),
    );
    let mut required = vec!["value".to_string(), "context".to_string(), "as_quote".to_string()];

    for (cast_name, cast) in &field.casts {
        let outward = outward_cast_name(cast_name, &cast.kind);
        properties.insert(outward.clone(), cast_schema(field_name, cast_name, cast));
        required.push(outward);
    }

    json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": required,
    })
}

fn tool_name(prefix: &str, collection: &Collection) -> String {
    format!("{prefix}_{}", collection.id())
}

/// Which of the three bound tools a tool-call name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Update,
    Conclude,
    ConfidentialUpdate,
}

/// Recovers which tool a name returned by the LLM refers to, given the
/// collection it was bound against.
pub fn parse_tool_name(name: &str, collection: &Collection) -> Option<ToolKind> {
    let suffix = format!("_{}", collection.id());
    let prefix = name.strip_suffix(&suffix)?;
    match prefix {
        "update" => Some(ToolKind::Update),
        "conclude" => Some(ToolKind::Conclude),
        "updateConfidential" => Some(ToolKind::ConfidentialUpdate),
        _ => None,
    }
}

/// The update tool: every non-conclude field, each optional and
/// nullable.
pub fn update_tool_schema(collection: &Collection) -> Value {
    let mut properties = serde_json::Map::new();
    for (name, field) in collection.master_fields() {
        let field_schema = field_object_schema(name, field, &collection.type_name);
        properties.insert(
            name.to_string(),
            json!({
                "anyOf": [field_schema, { "type": "null" }],
            }),
        );
    }
    json!({
        "name": tool_name("update", collection),
        "description": format!(
            "Record {} information for this {} conversation as it is learned from the user.",
            collection.bob.type_name, collection.type_name
        ),
        "parameters": {
            "type": "object",
            "properties": Value::Object(properties),
            "required": [],
        },
    })
}

/// The conclude tool: every conclude field, mandatory.
pub fn conclude_tool_schema(collection: &Collection) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for (name, field) in collection.conclude_fields() {
        properties.insert(
            name.to_string(),
            field_object_schema(name, field, &collection.type_name),
        );
        required.push(name.to_string());
    }
    json!({
        "name": tool_name("conclude", collection),
        "description": format!(
            "Synthesize final {} values for this {} conversation from the full transcript.",
            collection.bob.type_name, collection.type_name
        ),
        "parameters": {
            "type": "object",
            "properties": Value::Object(properties),
            "required": required,
        },
    })
}

/// The confidential-update tool, built per-invocation from only the
/// currently-unfilled confidential fields.
pub fn confidential_update_tool_schema(collection: &Collection) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for (name, field) in collection.unfilled_confidential_fields() {
        properties.insert(
            name.to_string(),
            field_object_schema(name, field, &collection.type_name),
        );
        required.push(name.to_string());
    }
    json!({
        "name": tool_name("updateConfidential", collection),
        "description": format!(
            "Record N/A (or a volunteered value) for confidential {} fields that were never solicited.",
            collection.type_name
        ),
        "parameters": {
            "type": "object",
            "properties": Value::Object(properties),
            "required": required,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::chatfield;

    fn collection_with_choice() -> Collection {
        chatfield()
            .type_name("Order")
            .field("size")
            .desc("What size?")
            .as_one("size", ["small", "medium", "large"])
            .field("summary")
            .desc("Summarize the order")
            .conclude()
            .build()
            .unwrap()
    }

    #[test]
    fn choice_prefix_renaming_round_trips() {
        assert_eq!(inward_to_outward_choice_prefix("as_one"), "choose_exactly_one");
        assert_eq!(
            outward_to_inward_choice_prefix("choose_exactly_one"),
            Some("as_one")
        );
        assert_eq!(inward_cast_name("choose_exactly_one_plan"), "as_one_plan");
    }

    #[test]
    fn update_tool_omits_conclude_fields() {
        let collection = collection_with_choice();
        let schema = update_tool_schema(&collection);
        let props = schema["parameters"]["properties"].as_object().unwrap();
        assert!(props.contains_key("size"));
        assert!(!props.contains_key("summary"));
        assert_eq!(schema["name"], "update_order");
    }

    #[test]
    fn conclude_tool_requires_all_its_fields() {
        let collection = collection_with_choice();
        let schema = conclude_tool_schema(&collection);
        let required = schema["parameters"]["required"].as_array().unwrap();
        assert_eq!(required, &[Value::String("summary".to_string())]);
        assert_eq!(schema["name"], "conclude_order");
    }

    #[test]
    fn choice_cast_is_exposed_under_outward_name_in_update_tool() {
        let collection = collection_with_choice();
        let schema = update_tool_schema(&collection);
        let size_schema = &schema["parameters"]["properties"]["size"]["anyOf"][0];
        let required = size_schema["required"].as_array().unwrap();
        assert!(required
            .iter()
            .any(|v| v == "choose_exactly_one_size"));
    }

    #[test]
    fn confidential_tool_only_contains_unfilled_confidential_fields() {
        let collection = chatfield()
            .type_name("Survey")
            .field("name")
            .desc("Your name?")
            .field("concerns")
            .desc("Any concerns?")
            .confidential()
            .as_bool()
            .build()
            .unwrap();
        let schema = confidential_update_tool_schema(&collection);
        let props = schema["parameters"]["properties"].as_object().unwrap();
        assert_eq!(props.len(), 1);
        assert!(props.contains_key("concerns"));
    }

    #[test]
    fn parse_tool_name_recovers_kind() {
        let collection = collection_with_choice();
        assert_eq!(
            parse_tool_name(&tool_name("update", &collection), &collection),
            Some(ToolKind::Update)
        );
        assert_eq!(
            parse_tool_name(&tool_name("conclude", &collection), &collection),
            Some(ToolKind::Conclude)
        );
        assert_eq!(parse_tool_name("not_a_real_tool", &collection), None);
    }

    #[test]
    fn schema_is_injective_in_collection_shape() {
        let a = collection_with_choice();
        let b = chatfield()
            .type_name("Order")
            .field("size")
            .desc("What size?")
            .as_one("size", ["small", "medium"])
            .field("summary")
            .desc("Summarize the order")
            .conclude()
            .build()
            .unwrap();
        assert_ne!(update_tool_schema(&a), update_tool_schema(&b));
    }
}
