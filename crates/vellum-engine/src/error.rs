//! Error types for engine operations.
//!
//! Transformation and detection never fail. Errors only come from reading
//! embeds back out of host nodes and from template validation.

use thiserror::Error;

use vellum_types::{EmbedKind, TemplateError};

/// Errors that can occur in the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A rendered embed node lacks an attribute its format needs.
    #[error("{kind} node is missing attribute `{attribute}`")]
    MissingAttribute {
        kind: EmbedKind,
        attribute: &'static str,
    },

    /// No format is registered for this embed key.
    #[error("no embed format registered for `{0}`")]
    UnknownEmbed(String),

    /// A format was handed a value of another kind.
    #[error("{expected} format cannot render a `{found}` embed")]
    KindMismatch { expected: EmbedKind, found: String },

    /// Template failed validation.
    #[error(transparent)]
    Template(#[from] TemplateError),
}
