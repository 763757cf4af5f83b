//! Embed formats: create a renderable node from a value, read a value back
//! from a (possibly edited) node.
//!
//! The set of formats is closed ([`PlaceholderFormat`] and [`NoteFormat`])
//! and dispatched by [`EmbedKind`]. There is no global registration: the host
//! builds an [`EmbedRegistry`] once at startup and hands it to whatever
//! component renders and saves documents.
//!
//! ```text
//!   EmbedValue ──create──▶ RenderedEmbed (host widget state)
//!                               │  user types into the inner region
//!                               ▼
//!   EmbedValue ◀──value──── &dyn EmbedNode
//! ```
//!
//! Read-back reads the node's *current* inner text. Identity attributes are
//! written once by `create` and never change.

use std::collections::HashMap;

use indexmap::IndexMap;

use vellum_types::{EditablePlaceholderEmbed, EmbedKind, EmbedValue, NoteEmbed};

use crate::error::EngineError;
use crate::ids::creation_id;
use crate::Result;

/// Node attribute holding a placeholder embed's id.
pub const ATTR_PLACEHOLDER_ID: &str = "data-placeholder-id";
/// Node attribute holding a placeholder embed's label.
pub const ATTR_PLACEHOLDER_LABEL: &str = "data-placeholder-label";
/// Node attribute holding the source token name.
pub const ATTR_ORIGINAL_NAME: &str = "data-original-placeholder-name";
/// Node attribute holding a note's id.
pub const ATTR_NOTE_ID: &str = "data-note-id";

/// Label shown when a placeholder value arrives without one.
pub const DEFAULT_PLACEHOLDER_LABEL: &str = "Editable Note:";
/// Prompt shown in an empty note.
pub const DEFAULT_NOTE_PROMPT: &str = "Type your note…";

/// What a host-rendered embed exposes for read-back.
///
/// Implemented by [`RenderedEmbed`]; hosts with their own widget tree
/// implement it for their node type.
pub trait EmbedNode {
    /// Which format rendered this node.
    fn kind(&self) -> EmbedKind;
    /// A node attribute set at creation time.
    fn attribute(&self, name: &str) -> Option<String>;
    /// The current contents of the node's editable region.
    fn inner_text(&self) -> String;
}

/// In-memory rendered embed: identity attributes plus live editable text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedEmbed {
    kind: EmbedKind,
    attributes: IndexMap<String, String>,
    inner_text: String,
    /// Greyed-out prompt for an empty editable region.
    pub prompt: Option<String>,
}

impl RenderedEmbed {
    fn new(kind: EmbedKind) -> Self {
        Self {
            kind,
            attributes: IndexMap::new(),
            inner_text: String::new(),
            prompt: None,
        }
    }

    fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Replace the editable region's contents (a user edit).
    pub fn set_inner_text(&mut self, text: impl Into<String>) {
        self.inner_text = text.into();
    }

    /// All attributes, in creation order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The id attribute of whichever format created this node.
    pub fn embed_id(&self) -> Option<&str> {
        let attr = match self.kind {
            EmbedKind::EditablePlaceholder => ATTR_PLACEHOLDER_ID,
            EmbedKind::Note => ATTR_NOTE_ID,
        };
        self.attributes.get(attr).map(String::as_str)
    }
}

impl EmbedNode for RenderedEmbed {
    fn kind(&self) -> EmbedKind {
        self.kind
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn inner_text(&self) -> String {
        self.inner_text.clone()
    }
}

/// Create/read-back behavior of one embed kind.
pub trait EmbedFormat: Send + Sync {
    fn kind(&self) -> EmbedKind;

    /// Render `value` into a fresh node.
    fn create(&self, value: &EmbedValue) -> Result<RenderedEmbed>;

    /// Current value of a rendered node.
    fn value(&self, node: &dyn EmbedNode) -> Result<EmbedValue>;

    /// Document length an embed occupies.
    fn length(&self) -> usize {
        1
    }
}

fn require(node: &dyn EmbedNode, attribute: &'static str) -> Result<String> {
    node.attribute(attribute)
        .filter(|v| !v.is_empty())
        .ok_or(EngineError::MissingAttribute {
            kind: node.kind(),
            attribute,
        })
}

fn mismatch(expected: EmbedKind, value: &EmbedValue) -> EngineError {
    EngineError::KindMismatch {
        expected,
        found: embed_key(value),
    }
}

/// The key an embed value is stored under (`"image"`, `"note"`, …).
pub fn embed_key(value: &EmbedValue) -> String {
    match value {
        EmbedValue::EditablePlaceholder(_) => EmbedKind::EditablePlaceholder.to_string(),
        EmbedValue::Note(_) => EmbedKind::Note.to_string(),
        EmbedValue::Other(serde_json::Value::Object(map)) => {
            map.keys().next().cloned().unwrap_or_default()
        }
        EmbedValue::Other(_) => String::new(),
    }
}

/// Inline editable placeholder.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderFormat;

impl EmbedFormat for PlaceholderFormat {
    fn kind(&self) -> EmbedKind {
        EmbedKind::EditablePlaceholder
    }

    fn create(&self, value: &EmbedValue) -> Result<RenderedEmbed> {
        let EmbedValue::EditablePlaceholder(embed) = value else {
            return Err(mismatch(self.kind(), value));
        };
        let id = if embed.id.is_empty() { creation_id("ph") } else { embed.id.clone() };
        let label = if embed.label.is_empty() {
            DEFAULT_PLACEHOLDER_LABEL.to_string()
        } else {
            embed.label.clone()
        };
        let mut node = RenderedEmbed::new(self.kind())
            .with_attribute(ATTR_PLACEHOLDER_ID, id)
            .with_attribute(ATTR_PLACEHOLDER_LABEL, label)
            .with_attribute(ATTR_ORIGINAL_NAME, embed.original_placeholder_name.clone());
        node.set_inner_text(embed.initial_content.clone());
        Ok(node)
    }

    fn value(&self, node: &dyn EmbedNode) -> Result<EmbedValue> {
        Ok(EmbedValue::EditablePlaceholder(EditablePlaceholderEmbed::new(
            require(node, ATTR_PLACEHOLDER_ID)?,
            node.attribute(ATTR_PLACEHOLDER_LABEL).unwrap_or_default(),
            node.inner_text(),
            node.attribute(ATTR_ORIGINAL_NAME).unwrap_or_default(),
        )))
    }
}

/// Block-level freeform note.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoteFormat;

impl EmbedFormat for NoteFormat {
    fn kind(&self) -> EmbedKind {
        EmbedKind::Note
    }

    fn create(&self, value: &EmbedValue) -> Result<RenderedEmbed> {
        let EmbedValue::Note(note) = value else {
            return Err(mismatch(self.kind(), value));
        };
        let id = if note.id.is_empty() { creation_id("note") } else { note.id.clone() };
        let mut node = RenderedEmbed::new(self.kind()).with_attribute(ATTR_NOTE_ID, id);
        node.set_inner_text(note.text.clone());
        node.prompt = Some(DEFAULT_NOTE_PROMPT.to_string());
        Ok(node)
    }

    fn value(&self, node: &dyn EmbedNode) -> Result<EmbedValue> {
        Ok(EmbedValue::Note(NoteEmbed::new(
            require(node, ATTR_NOTE_ID)?,
            node.inner_text(),
        )))
    }
}

/// The formats a host supports, keyed by kind.
pub struct EmbedRegistry {
    formats: HashMap<EmbedKind, Box<dyn EmbedFormat>>,
}

impl EmbedRegistry {
    /// A registry with no formats.
    pub fn empty() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    /// Placeholder and note formats.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(PlaceholderFormat);
        registry.register(NoteFormat);
        registry
    }

    /// Add or replace the format for its kind.
    pub fn register(&mut self, format: impl EmbedFormat + 'static) {
        self.formats.insert(format.kind(), Box::new(format));
    }

    pub fn get(&self, kind: EmbedKind) -> Option<&dyn EmbedFormat> {
        self.formats.get(&kind).map(|f| f.as_ref())
    }

    pub fn supports(&self, kind: EmbedKind) -> bool {
        self.formats.contains_key(&kind)
    }

    /// Render an embed value with its format.
    pub fn create(&self, value: &EmbedValue) -> Result<RenderedEmbed> {
        let format = value
            .kind()
            .and_then(|kind| self.get(kind))
            .ok_or_else(|| EngineError::UnknownEmbed(embed_key(value)))?;
        format.create(value)
    }

    /// Read the current value out of a rendered node.
    pub fn value(&self, node: &dyn EmbedNode) -> Result<EmbedValue> {
        let kind = node.kind();
        let format = self
            .get(kind)
            .ok_or_else(|| EngineError::UnknownEmbed(kind.to_string()))?;
        format.value(node)
    }
}

impl Default for EmbedRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for EmbedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.formats.keys().map(EmbedKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("EmbedRegistry").field("formats", &kinds).finish()
    }
}
