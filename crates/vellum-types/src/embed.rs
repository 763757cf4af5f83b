//! Embed values carried inside a Delta insert.
//!
//! An embed insert is a JSON object with exactly one key naming the embed
//! type: `{"editable-placeholder": {...}}` or `{"note": {...}}`. The set of
//! embeds Vellum understands is closed ([`EmbedKind`]). Everything else
//! (images, tables, third-party widgets) is kept as [`EmbedValue::Other`] and
//! round-trips untouched.

use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::EnumString;

/// The embed types Vellum knows how to create and read back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
pub enum EmbedKind {
    /// Inline editable value produced from a `{{NAME}}` token.
    #[serde(rename = "editable-placeholder")]
    #[strum(serialize = "editable-placeholder")]
    EditablePlaceholder,
    /// Block-level freeform note inserted by the user.
    #[serde(rename = "note")]
    #[strum(serialize = "note")]
    Note,
}

impl EmbedKind {
    /// Parse from the embed key (exact match).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// The embed key used in Delta JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedKind::EditablePlaceholder => "editable-placeholder",
            EmbedKind::Note => "note",
        }
    }
}

impl std::fmt::Display for EmbedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Embed body as read from JSON.
type Body = serde_json::Map<String, serde_json::Value>;

/// A placeholder token turned into a stateful, editable value.
///
/// `id` and `original_placeholder_name` are fixed at creation. Only
/// `initial_content` changes when the value is read back from an edited node.
///
/// An embed parsed from JSON keeps the body it came from and serializes back
/// into it: key order and absent optional keys are preserved, so an embed
/// nobody edited is written out exactly as it was read.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EditablePlaceholderEmbed {
    /// Unique per embed instance within one document.
    pub id: String,
    /// Prompt shown next to the editable region.
    pub label: String,
    /// Current (or pre-filled) value.
    pub initial_content: String,
    /// The `NAME` of the `{{NAME}}` token this embed replaced. Older
    /// documents omit it.
    #[serde(default)]
    pub original_placeholder_name: String,
    #[serde(skip)]
    source: Option<Body>,
}

impl EditablePlaceholderEmbed {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        initial_content: impl Into<String>,
        original_placeholder_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            initial_content: initial_content.into(),
            original_placeholder_name: original_placeholder_name.into(),
            source: None,
        }
    }
}

impl PartialEq for EditablePlaceholderEmbed {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.label == other.label
            && self.initial_content == other.initial_content
            && self.original_placeholder_name == other.original_placeholder_name
    }
}

impl Eq for EditablePlaceholderEmbed {}

impl Serialize for EditablePlaceholderEmbed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut body = BodyWriter::new(self.source.as_ref());
        body.required("id", &self.id);
        body.required("label", &self.label);
        body.required("initialContent", &self.initial_content);
        body.optional("originalPlaceholderName", &self.original_placeholder_name);
        body.finish().serialize(serializer)
    }
}

/// A freeform note block.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteEmbed {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(skip)]
    source: Option<Body>,
}

impl NoteEmbed {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source: None,
        }
    }
}

impl PartialEq for NoteEmbed {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.text == other.text
    }
}

impl Eq for NoteEmbed {}

impl Serialize for NoteEmbed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut body = BodyWriter::new(self.source.as_ref());
        body.required("id", &self.id);
        body.optional("text", &self.text);
        body.finish().serialize(serializer)
    }
}

/// Writes typed fields over the body an embed was parsed from.
///
/// Keys already present keep their position. An empty optional field that
/// the source body did not have stays absent. Freshly built embeds (no
/// source) get every field.
struct BodyWriter {
    body: Body,
    sourced: bool,
}

impl BodyWriter {
    fn new(source: Option<&Body>) -> Self {
        Self {
            body: source.cloned().unwrap_or_default(),
            sourced: source.is_some(),
        }
    }

    fn required(&mut self, key: &str, value: &str) {
        self.body
            .insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }

    fn optional(&mut self, key: &str, value: &str) {
        if self.sourced && value.is_empty() && !self.body.contains_key(key) {
            return;
        }
        self.required(key, value);
    }

    fn finish(self) -> Body {
        self.body
    }
}

/// Payload of an embed insert.
#[derive(Clone, Debug, PartialEq)]
pub enum EmbedValue {
    EditablePlaceholder(EditablePlaceholderEmbed),
    Note(NoteEmbed),
    /// Any embed Vellum does not model, kept verbatim.
    Other(serde_json::Value),
}

impl EmbedValue {
    /// Interpret a raw embed payload.
    ///
    /// A single-key object whose key is a known [`EmbedKind`] and whose body
    /// matches that kind's shape becomes a typed variant. Anything else,
    /// including a known key with an unexpected body, stays opaque so it is
    /// written back exactly as it was read.
    pub fn from_value(value: serde_json::Value) -> Self {
        if let serde_json::Value::Object(map) = &value {
            if map.len() == 1 {
                if let Some((key, body)) = map.iter().next() {
                    match EmbedKind::from_str(key) {
                        Some(EmbedKind::EditablePlaceholder) => {
                            if let Ok(mut embed) =
                                serde_json::from_value::<EditablePlaceholderEmbed>(body.clone())
                            {
                                embed.source = body.as_object().cloned();
                                return EmbedValue::EditablePlaceholder(embed);
                            }
                        }
                        Some(EmbedKind::Note) => {
                            if let Ok(mut note) = serde_json::from_value::<NoteEmbed>(body.clone()) {
                                note.source = body.as_object().cloned();
                                return EmbedValue::Note(note);
                            }
                        }
                        None => {}
                    }
                }
            }
        }
        EmbedValue::Other(value)
    }

    /// The modelled kind, or `None` for opaque embeds.
    pub fn kind(&self) -> Option<EmbedKind> {
        match self {
            EmbedValue::EditablePlaceholder(_) => Some(EmbedKind::EditablePlaceholder),
            EmbedValue::Note(_) => Some(EmbedKind::Note),
            EmbedValue::Other(_) => None,
        }
    }

    /// Instance id of a modelled embed.
    pub fn id(&self) -> Option<&str> {
        match self {
            EmbedValue::EditablePlaceholder(p) => Some(&p.id),
            EmbedValue::Note(n) => Some(&n.id),
            EmbedValue::Other(_) => None,
        }
    }

    pub fn as_placeholder(&self) -> Option<&EditablePlaceholderEmbed> {
        match self {
            EmbedValue::EditablePlaceholder(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_note(&self) -> Option<&NoteEmbed> {
        match self {
            EmbedValue::Note(n) => Some(n),
            _ => None,
        }
    }
}

impl From<EditablePlaceholderEmbed> for EmbedValue {
    fn from(embed: EditablePlaceholderEmbed) -> Self {
        EmbedValue::EditablePlaceholder(embed)
    }
}

impl From<NoteEmbed> for EmbedValue {
    fn from(note: NoteEmbed) -> Self {
        EmbedValue::Note(note)
    }
}

impl Serialize for EmbedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EmbedValue::EditablePlaceholder(embed) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(EmbedKind::EditablePlaceholder.as_str(), embed)?;
                map.end()
            }
            EmbedValue::Note(note) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(EmbedKind::Note.as_str(), note)?;
                map.end()
            }
            EmbedValue::Other(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for EmbedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(EmbedValue::from_value(value))
    }
}
