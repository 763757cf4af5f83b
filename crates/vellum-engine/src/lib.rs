//! Placeholder engine for Vellum proposal templates.
//!
//! Turns template text into fillable documents and back:
//!
//! ```text
//!  template Delta ──detect──▶ PlaceholderDefinition[]        (authoring, save time)
//!        │
//!        └──transform(defs, values)──▶ Delta with editable-placeholder embeds
//!                                          │  host renders via EmbedRegistry
//!                                          ▼
//!                                    edited nodes ──apply_read_back──▶ Delta
//!                                                          │
//!                                          harvest_values / flatten
//! ```
//!
//! # Guarantees
//!
//! - [`transform`] and [`detect`] are pure: no I/O, no shared state, input
//!   never mutated. They never fail; malformed input degrades to identity.
//! - Ops without a matching token, and all embeds, come out exactly as they
//!   went in. Re-running [`transform`] on its own output is a no-op.
//! - Overlapping names resolve to the longest: `{{CLIENT_NAME}}` never matches
//!   as `CLIENT` plus leftover text.
//! - Read-back only ever changes an embed's editable content, never its id
//!   or source placeholder name.

pub mod compose;
pub mod detect;
mod error;
pub mod format;
pub mod harvest;
pub mod ids;
pub mod matcher;
pub mod transform;

pub use compose::{client_name, compose_proposal, prepare_template, proposal_title, seed_client_name};
pub use detect::{detect, detect_all, merge_definitions};
pub use error::EngineError;
pub use format::{EmbedFormat, EmbedNode, EmbedRegistry, NoteFormat, PlaceholderFormat, RenderedEmbed};
pub use harvest::{apply_read_back, flatten, harvest_notes, harvest_values};
pub use ids::{IdAllocator, IdStrategy};
pub use matcher::PlaceholderMatcher;
pub use transform::{Transformer, transform};

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
