//! Delta, embed, placeholder and template types for Vellum.
//!
//! This crate is the data foundation: typed IDs, the Delta document model,
//! the embed values that live inside a Delta, placeholder definitions and
//! template/proposal records. It has **no internal vellum dependencies**:
//! a pure leaf crate that the engine and the CLI build on.
//!
//! # Relationship Overview
//!
//! ```text
//! Template (TemplateId)
//!     └── sections: TemplateSection (order, content_type, Delta)
//!     └── placeholders: PlaceholderDefinition ({{NAME}} tokens)
//!
//! Delta ← ordered Op sequence
//!     └── Op = Insert::Text(run) | Insert::Embed(EmbedValue), attributes?
//!
//! EmbedValue
//!     └── EditablePlaceholder ← produced from a {{NAME}} token
//!     └── Note                ← inserted by the user while editing
//!     └── Other               ← images, tables, anything opaque
//!
//! Proposal (ProposalId) ← composed from a Template
//! ```
//!
//! # Key Types
//!
//! |-----------------------------|---------------------------------------------|
//! | Type                        | Purpose                                     |
//! |-----------------------------|---------------------------------------------|
//! | [`Delta`]                   | Ordered rich-text document                  |
//! | [`Op`]                      | One insert, text or embed, with attributes  |
//! | [`EmbedValue`]              | Typed embed payload (closed set + opaque)   |
//! | [`EditablePlaceholderEmbed`]| Stateful, editable placeholder instance     |
//! | [`NoteEmbed`]               | Freeform user note                          |
//! | [`PlaceholderDefinition`]   | Template metadata for one `{{NAME}}`        |
//! | [`Template`]                | Stored template record                      |
//! | [`Proposal`]                | Composed proposal record                    |
//! |-----------------------------|---------------------------------------------|

pub mod delta;
pub mod embed;
pub mod ids;
pub mod placeholder;
pub mod template;

// Re-export primary types at crate root for convenience.
pub use delta::{Attributes, Delta, DeltaError, Insert, Op};
pub use embed::{EditablePlaceholderEmbed, EmbedKind, EmbedValue, NoteEmbed};
pub use ids::{ProposalId, TemplateId};
pub use placeholder::{PlaceholderDefinition, Values};
pub use template::{ContentType, Proposal, SectionContent, Template, TemplateError, TemplateSection};

/// Current time as Unix milliseconds. Used for timestamped ids.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
