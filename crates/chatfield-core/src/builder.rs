//! Fluent construction DSL for [`Collection`].
//!
//! Rust has no `type`/`trait` identifiers to reuse as method names and
//! no dynamic "current context" object, so the builder tracks which
//! component (collection / role / field) is under construction as
//! explicit state and routes each call accordingly.
//!
//! Builder errors (duplicate names, bad chaining, oversized type name)
//! are accumulated rather than aborting the chain immediately, and
//! surface together from [`ChatfieldBuilder::build`] — this lets a
//! host write a whole `.field(...).must(...).as_int()` chain without
//! threading `Result` through every call.

use crate::collection::field::{Cast, CastKind, Field};
use crate::collection::role::{PossibleTrait, RoleKind};
use crate::collection::Collection;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Context {
    Collection,
    Role(RoleKind),
    Field(String),
}

/// Entry point for declaring a new collection.
pub fn chatfield() -> ChatfieldBuilder {
    ChatfieldBuilder::new()
}

pub struct ChatfieldBuilder {
    collection: Collection,
    context: Context,
    errors: Vec<Error>,
}

impl ChatfieldBuilder {
    pub fn new() -> Self {
        Self {
            collection: Collection::new(String::new()),
            context: Context::Collection,
            errors: Vec::new(),
        }
    }

    fn push_error(&mut self, err: Error) {
        self.errors.push(err);
    }

    /// Sets the "class name" of the collection (context: none/collection)
    /// or the display type of the current role (context: role).
    pub fn type_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        match &self.context {
            Context::Role(kind) => match kind {
                RoleKind::Alice => self.collection.alice.type_name = name,
                RoleKind::Bob => self.collection.bob.type_name = name,
            },
            _ => {
                if name.chars().count() > crate::collection::TYPE_NAME_MAX_LEN {
                    self.push_error(Error::TypeNameTooLong(name.clone()));
                }
                self.collection.type_name = name;
            }
        }
        self
    }

    /// Sets the free-form description of the collection (context: none)
    /// or of the question/topic for the current field (context: field).
    pub fn desc(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        match &self.context {
            Context::Field(name) => {
                if let Some(field) = self.collection.fields.get_mut(name) {
                    field.desc = text;
                } else {
                    self.push_error(Error::NoActiveField {
                        method: "desc".to_string(),
                    });
                }
            }
            _ => self.collection.desc = Some(text),
        }
        self
    }

    /// Switches the current context to the assistant role.
    pub fn alice(mut self) -> Self {
        self.context = Context::Role(RoleKind::Alice);
        self
    }

    /// Switches the current context to the user role.
    pub fn bob(mut self) -> Self {
        self.context = Context::Role(RoleKind::Bob);
        self
    }

    /// Adds an unconditional trait to the current role.
    pub fn add_trait(mut self, text: impl Into<String>) -> Self {
        match self.context.clone() {
            Context::Role(kind) => {
                let role = match kind {
                    RoleKind::Alice => &mut self.collection.alice,
                    RoleKind::Bob => &mut self.collection.bob,
                };
                role.traits.push(text.into());
            }
            _ => self.push_error(Error::NoActiveRole {
                method: "add_trait".to_string(),
            }),
        }
        self
    }

    /// Adds a possible (conditionally-activatable) trait to the current role.
    pub fn possible_trait(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        match self.context.clone() {
            Context::Role(kind) => {
                let role = match kind {
                    RoleKind::Alice => &mut self.collection.alice,
                    RoleKind::Bob => &mut self.collection.bob,
                };
                role.possible_traits
                    .insert(name.into(), PossibleTrait::new(description));
            }
            _ => self.push_error(Error::NoActiveRole {
                method: "possible_trait".to_string(),
            }),
        }
        self
    }

    /// Switches context to a new field, inserted at the end, and makes
    /// it the target of subsequent `.desc`/`.must`/`.reject`/`.hint`/
    /// `.confidential`/`.conclude`/`.as_*` calls.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if self.collection.fields.contains_key(&name) {
            self.push_error(Error::DuplicateField(name.clone()));
        } else {
            self.collection.fields.insert(name.clone(), Field::new(""));
        }
        self.context = Context::Field(name);
        self
    }

    fn with_active_field<F: FnOnce(&mut Field)>(mut self, method: &str, f: F) -> Self {
        match self.context.clone() {
            Context::Field(name) => {
                if let Some(field) = self.collection.fields.get_mut(&name) {
                    f(field);
                } else {
                    self.push_error(Error::NoActiveField {
                        method: method.to_string(),
                    });
                }
            }
            _ => self.push_error(Error::NoActiveField {
                method: method.to_string(),
            }),
        }
        self
    }

    pub fn must(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.with_active_field("must", |f| f.specs.must.push(text))
    }

    pub fn reject(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.with_active_field("reject", |f| f.specs.reject.push(text))
    }

    pub fn hint(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.with_active_field("hint", |f| f.specs.hint.push(text))
    }

    pub fn confidential(self) -> Self {
        self.with_active_field("confidential", |f| f.specs.confidential = true)
    }

    pub fn conclude(self) -> Self {
        self.with_active_field("conclude", |f| f.specs.conclude = true)
    }

    fn add_cast(self, name: &'static str, kind: CastKind, prompt: impl Into<String>) -> Self {
        self.add_cast_named(name.to_string(), kind, prompt)
    }

    fn add_cast_named(mut self, name: String, kind: CastKind, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        match self.context.clone() {
            Context::Field(field_name) => {
                if let Some(field) = self.collection.fields.get_mut(&field_name) {
                    if field.casts.contains_key(&name) {
                        self.push_error(Error::DuplicateCast { field: field_name, cast: name });
                    } else {
                        field.casts.insert(name, Cast::new(kind, prompt));
                    }
                } else {
                    self.push_error(Error::NoActiveField { method: "as_*".to_string() });
                }
            }
            _ => self.push_error(Error::NoActiveField { method: "as_*".to_string() }),
        }
        self
    }

    pub fn as_int(self) -> Self {
        self.add_cast("as_int", CastKind::Int, "the value coerced to an integer")
    }

    pub fn as_int_named(self, name: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.add_cast_named(name.into(), CastKind::Int, prompt)
    }

    pub fn as_float(self) -> Self {
        self.add_cast("as_float", CastKind::Float, "the value coerced to a real number")
    }

    pub fn as_float_named(self, name: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.add_cast_named(name.into(), CastKind::Float, prompt)
    }

    /// `.as_str(name, prompt)` — always explicitly named, since a cast
    /// exists to give the LLM a second, differently-typed view of the
    /// same answer.
    pub fn as_str(self, name: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.add_cast_named(name.into(), CastKind::Str, prompt)
    }

    pub fn as_bool(self) -> Self {
        self.add_cast("as_bool", CastKind::Bool, "whether the value is true or false")
    }

    pub fn as_bool_named(self, name: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.add_cast_named(name.into(), CastKind::Bool, prompt)
    }

    pub fn as_percent(self) -> Self {
        self.add_cast(
            "as_percent",
            CastKind::Float,
            "the value expressed as a fraction between 0.0 and 1.0",
        )
    }

    pub fn as_percent_named(self, name: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.add_cast_named(name.into(), CastKind::Float, prompt)
    }

    pub fn as_list(self) -> Self {
        self.add_cast("as_list", CastKind::List, "the value as an ordered list")
    }

    pub fn as_list_named(self, name: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.add_cast_named(name.into(), CastKind::List, prompt)
    }

    pub fn as_set(self) -> Self {
        self.add_cast(
            "as_set",
            CastKind::Set,
            "the value as a deduplicated collection",
        )
    }

    pub fn as_set_named(self, name: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.add_cast_named(name.into(), CastKind::Set, prompt)
    }

    pub fn as_dict(self) -> Self {
        self.add_cast(
            "as_dict",
            CastKind::Dict,
            "the value as a string-keyed mapping",
        )
    }

    /// Alias for [`Self::as_dict`].
    pub fn as_obj(self) -> Self {
        self.as_dict()
    }

    pub fn as_dict_named(self, name: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.add_cast_named(name.into(), CastKind::Dict, prompt)
    }

    /// Translation to ISO-639-1 `code`, stored under `as_lang_<code>`.
    pub fn as_lang(self, code: &str) -> Self {
        let prompt = format!("translation of the value into language code '{code}'");
        self.add_cast_named(format!("as_lang_{code}"), CastKind::Str, prompt)
    }

    pub fn as_lang_with(self, code: &str, prompt: impl Into<String>) -> Self {
        self.add_cast_named(format!("as_lang_{code}"), CastKind::Str, prompt)
    }

    /// Marks that the verbatim quote should be emphasized. The base
    /// `as_quote` key is always present on a collected value, so this call is permitted but has no schema effect.
    pub fn as_quote(self) -> Self {
        self.with_active_field("as_quote", |_| {})
    }

    /// Marks that the context summary should be emphasized. See
    /// [`Self::as_quote`] — `context` is likewise always present.
    pub fn as_context(self) -> Self {
        self.with_active_field("as_context", |_| {})
    }

    fn add_choice_cast(self, prefix: &'static str, name: impl Into<String>, choices: Vec<String>, multi: bool, nullable: bool) -> Self {
        let name = name.into();
        let cast_name = format!("{prefix}_{name}");
        let prompt = format!("a choice among the {name} options for {{name}}");
        self.add_cast_named(
            cast_name,
            CastKind::Choice {
                choices,
                multi,
                nullable,
            },
            prompt,
        )
    }

    /// Exactly-one choice cast, stored under `as_one_<name>`.
    pub fn as_one(self, name: impl Into<String>, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let choices = choices.into_iter().map(Into::into).collect();
        self.add_choice_cast("as_one", name, choices, false, false)
    }

    /// Zero-or-one choice cast, stored under `as_maybe_<name>`.
    pub fn as_maybe(self, name: impl Into<String>, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let choices = choices.into_iter().map(Into::into).collect();
        self.add_choice_cast("as_maybe", name, choices, false, true)
    }

    /// Alias for [`Self::as_maybe`].
    pub fn as_nullable_one(self, name: impl Into<String>, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.as_maybe(name, choices)
    }

    /// One-or-more choice cast, stored under `as_multi_<name>`.
    pub fn as_multi(self, name: impl Into<String>, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let choices = choices.into_iter().map(Into::into).collect();
        self.add_choice_cast("as_multi", name, choices, true, false)
    }

    /// Zero-or-more choice cast, stored under `as_any_<name>`.
    pub fn as_any(self, name: impl Into<String>, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let choices = choices.into_iter().map(Into::into).collect();
        self.add_choice_cast("as_any", name, choices, true, true)
    }

    /// Alias for [`Self::as_any`].
    pub fn as_nullable_multi(self, name: impl Into<String>, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.as_any(name, choices)
    }

    /// Finalizes the builder, validating field/cast-name uniqueness
    /// and the collection's type-name length. Returns the first error
    /// encountered during chaining, if any, else the first validation
    /// failure from [`Collection::validate`].
    pub fn build(mut self) -> Result<Collection> {
        if let Some(err) = self.errors.drain(..).next() {
            return Err(err);
        }
        self.collection.validate()?;
        Ok(self.collection)
    }
}

impl Default for ChatfieldBuilder {
    fn default() -> Self {
        Self::new()
    }
}
