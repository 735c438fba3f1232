//! Prompt synthesis.
//!
//! Three prompt variants are rendered from one [`Collection`] via a
//! minimal template-engine collaborator (`minijinja`).
//! Rendering is a pure function of `(Collection, PromptMode)` — same
//! inputs always produce the same bytes — because the
//! context is built deterministically from the collection's ordered
//! field map and no non-deterministic source (clock, RNG, hash-map
//! iteration) ever reaches the template.

use crate::collection::field::Specs;
use crate::collection::role::RoleSpec;
use crate::collection::Collection;
use minijinja::{context, Environment};
use serde::Serialize;
use std::sync::OnceLock;

/// Which of the three system-prompt variants to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Ordinary conversational collection of master fields.
    Normal,
    /// One-shot digest of unfilled confidential fields.
    ConfidentialDigest,
    /// One-shot digest that synthesizes conclude fields.
    ConcludeDigest,
}

const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are {{ alice_type }}{% if alice_traits %}, {{ alice_traits | join(", ") }}{% endif %}.
You are speaking with {{ bob_type }}{% if bob_traits %}, {{ bob_traits | join(", ") }}{% endif %}.
{% if desc %}

This conversation is about: {{ desc }}
{% endif %}
{% if alice_possible_traits %}

{{ alice_type }} may also, depending on how the conversation goes:
{% for t in alice_possible_traits %}- {{ t }}
{% endfor %}{% endif %}
{% if bob_possible_traits %}

{{ bob_type }} may also, depending on how the conversation goes:
{% for t in bob_possible_traits %}- {{ t }}
{% endfor %}{% endif %}

{% if labels %}Validation categories in play: {{ labels }}.{% endif %}

Collect the following information over the course of the conversation. Use the
update tool the moment you learn something relevant — do not wait until the
end.

{% for f in fields %}- {{ f.name }}: {{ f.desc }}
{% for m in f.must %}  Must: {{ m }}
{% endfor %}{% for r in f.reject %}  Reject: {{ r }}
{% endfor %}{% for h in f.hint %}  Hint: {{ h }}
{% endfor %}{% if f.confidential %}  Confidential: never ask about this field directly; only record it if {{ bob_type }} volunteers it unprompted.
{% endif %}{% endfor %}"#;

const CONFIDENTIAL_DIGEST_TEMPLATE: &str = r#"The conversation has gathered everything it needs from {{ bob_type }}.

Before continuing, you must record the following fields, which were never
asked about directly. For each, call the confidential-update tool with the
value "N/A" unless {{ bob_type }} volunteered something relevant earlier in
the conversation:

{% for f in fields %}- {{ f.name }}: {{ f.desc }}
{% endfor %}
Emit exactly one tool call containing every field listed above."#;

const CONCLUDE_DIGEST_TEMPLATE: &str = r#"The conversation with {{ bob_type }} is complete.

You must now synthesize answers to the following fields by reviewing the
entire transcript. These are not solicited from {{ bob_type }} — you are
answering them yourself based on everything said so far:

{% for f in fields %}- {{ f.name }}: {{ f.desc }}
{% endfor %}
Emit exactly one tool call containing a value for every field listed above."#;

fn environment() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.add_template("system_prompt", SYSTEM_PROMPT_TEMPLATE)
            .expect("system_prompt template must compile");
        env.add_template("confidential_digest", CONFIDENTIAL_DIGEST_TEMPLATE)
            .expect("confidential_digest template must compile");
        env.add_template("conclude_digest", CONCLUDE_DIGEST_TEMPLATE)
            .expect("conclude_digest template must compile");
        env
    })
}

#[derive(Debug, Serialize)]
struct FieldContext {
    name: String,
    desc: String,
    must: Vec<String>,
    reject: Vec<String>,
    hint: Vec<String>,
    confidential: bool,
}

impl FieldContext {
    fn from_field(name: &str, desc: &str, specs: &Specs) -> Self {
        Self {
            name: name.to_string(),
            desc: desc.to_string(),
            must: specs.must.clone(),
            reject: specs.reject.clone(),
            hint: specs.hint.clone(),
            confidential: specs.confidential,
        }
    }
}

/// `"Must"`, `"Reject"`, or `"Must" and "Reject"`, or empty — the
/// human phrase describing which validation categories exist.
fn validation_labels(fields: &[FieldContext]) -> String {
    let has_must = fields.iter().any(|f| !f.must.is_empty());
    let has_reject = fields.iter().any(|f| !f.reject.is_empty());
    match (has_must, has_reject) {
        (true, true) => "\"Must\" and \"Reject\"".to_string(),
        (true, false) => "\"Must\"".to_string(),
        (false, true) => "\"Reject\"".to_string(),
        (false, false) => String::new(),
    }
}

fn role_traits(role: &RoleSpec) -> Vec<String> {
    role.traits.clone()
}

fn role_possible_traits(role: &RoleSpec) -> Vec<String> {
    role.possible_traits
        .iter()
        .map(|(name, t)| format!("{name}: {}", t.description))
        .collect()
}

/// Renders the requested prompt variant. Pure function of `(collection, mode)`.
pub fn render(collection: &Collection, mode: PromptMode) -> String {
    let env = environment();
    match mode {
        PromptMode::Normal => {
            let fields: Vec<FieldContext> = collection
                .master_fields()
                .map(|(name, field)| FieldContext::from_field(name, &field.desc, &field.specs))
                .collect();
            let labels = validation_labels(&fields);
            let tmpl = env.get_template("system_prompt").unwrap();
            tmpl.render(context! {
                alice_type => collection.alice.type_name,
                alice_traits => role_traits(&collection.alice),
                alice_possible_traits => role_possible_traits(&collection.alice),
                bob_type => collection.bob.type_name,
                bob_traits => role_traits(&collection.bob),
                bob_possible_traits => role_possible_traits(&collection.bob),
                desc => collection.desc,
                labels => labels,
                fields => fields,
            })
                .expect("system_prompt renders")
        }
        PromptMode::ConfidentialDigest => {
            let fields: Vec<FieldContext> = collection
                .unfilled_confidential_fields()
                .map(|(name, field)| FieldContext::from_field(name, &field.desc, &field.specs))
                .collect();
            let tmpl = env.get_template("confidential_digest").unwrap();
            tmpl.render(context! {
                bob_type => collection.bob.type_name,
                fields => fields,
            })
                .expect("confidential_digest renders")
        }
        PromptMode::ConcludeDigest => {
            let fields: Vec<FieldContext> = collection
                .conclude_fields()
                .map(|(name, field)| FieldContext::from_field(name, &field.desc, &field.specs))
                .collect();
            let tmpl = env.get_template("conclude_digest").unwrap();
            tmpl.render(context! {
                bob_type => collection.bob.type_name,
                fields => fields,
            })
                .expect("conclude_digest renders")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::chatfield;

    fn trip_collection() -> Collection {
        chatfield()
            .type_name("Trip")
            .desc("Plan a weekend trip")
            .alice()
            .type_name("Travel Agent")
            .add_trait("friendly")
            .bob()
            .type_name("Traveler")
            .field("destination")
            .desc("Where would you like to go?")
            .must("be a real place")
            .field("concerns")
            .desc("Any health concerns?")
            .confidential()
            .as_bool()
            .build()
            .unwrap()
    }

    #[test]
    fn rendering_is_pure_and_byte_stable() {
        let collection = trip_collection();
        let a = render(&collection, PromptMode::Normal);
        let b = render(&collection, PromptMode::Normal);
        assert_eq!(a, b);
    }

    #[test]
    fn normal_prompt_names_roles_and_fields() {
        let collection = trip_collection();
        let rendered = render(&collection, PromptMode::Normal);
        assert!(rendered.contains("Travel Agent"));
        assert!(rendered.contains("Traveler"));
        assert!(rendered.contains("destination"));
        assert!(rendered.contains("Must:"));
        assert!(rendered.contains("Confidential:"));
    }

    #[test]
    fn normal_prompt_never_solicits_confidential_fields() {
        let collection = trip_collection();
        let rendered = render(&collection, PromptMode::Normal);
        // "concerns" is listed under master_fields()? No -- confidential
        // fields remain master (non-conclude) fields and ARE listed, but
        // with an explicit instruction never to solicit them.
        assert!(rendered.contains("never ask about this field directly"));
    }

    #[test]
    fn confidential_digest_lists_only_unfilled_confidential_fields() {
        let collection = trip_collection();
        let rendered = render(&collection, PromptMode::ConfidentialDigest);
        assert!(rendered.contains("concerns"));
        assert!(!rendered.contains("destination"));
    }

    #[test]
    fn different_collections_render_different_prompts() {
        let a = trip_collection();
        let mut b = trip_collection();
        b.desc = Some("A different description".to_string());
        assert_ne!(render(&a, PromptMode::Normal), render(&b, PromptMode::Normal));
    }
}
