//! Error types for the chatfield-core crate.

use thiserror::Error;

/// Errors raised while building or validating a [`crate::Collection`].
///
/// These surface synchronously from the builder method (or from
/// `.build()`) that caused them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("collection type name exceeds 64 characters: {0:?}")]
    TypeNameTooLong(String),

    #[error("duplicate field name: {0:?}")]
    DuplicateField(String),

    #[error("duplicate cast name {cast:?} on field {field:?}")]
    DuplicateCast { field: String, cast: String },

    #[error("cast name {cast:?} on field {field:?} collides with reserved key")]
    ReservedCastName { field: String, cast: String },

    #[error("builder method {method:?} requires an active field context, but none is set")]
    NoActiveField { method: String },

    #[error("builder method {method:?} requires an active role context, but none is set")]
    NoActiveRole { method: String },

    #[error("choice cast {cast:?} on field {field:?} was declared with no choices")]
    EmptyChoices { field: String, cast: String },

    #[error("unknown cast type: {0:?}")]
    UnknownCastType(String),
}

pub type Result<T> = std::result::Result<T, Error>;
