//! The Delta document model.
//!
//! A [`Delta`] is an ordered list of insert operations: the linear document.
//! Each [`Op`] is either a text run or an embed, with optional formatting
//! attributes that Vellum never interprets.
//!
//! ## Wire shape
//!
//! ```json
//! {"ops": [
//!   {"insert": "Hello ", "attributes": {"bold": true}},
//!   {"insert": {"editable-placeholder": {"id": "…", "label": "…", "initialContent": "", "originalPlaceholderName": "NAME"}}},
//!   {"insert": "\n"}
//! ]}
//! ```
//!
//! ## Leniency
//!
//! Deserialization never fails on document *structure*: `null`, a missing or
//! non-array `ops`, and individual ops that are not inserts all degrade to
//! "less document" rather than an error. Only invalid JSON syntax surfaces as
//! [`DeltaError`] from [`Delta::parse`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::embed::EmbedValue;

/// Opaque formatting attributes (`bold`, `color`, `header`, …).
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Errors from reading Delta JSON.
#[derive(Debug, thiserror::Error)]
pub enum DeltaError {
    #[error("invalid delta JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// What an op inserts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Insert {
    /// A run of plain text.
    Text(String),
    /// An atomic non-text unit.
    Embed(EmbedValue),
}

/// One element of a Delta.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Op {
    pub insert: Insert,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

impl Op {
    /// Plain text insert with no attributes.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            insert: Insert::Text(text.into()),
            attributes: None,
        }
    }

    /// Text insert with the given attributes.
    pub fn text_with(text: impl Into<String>, attributes: Option<Attributes>) -> Self {
        Self {
            insert: Insert::Text(text.into()),
            attributes,
        }
    }

    /// Embed insert with no attributes.
    pub fn embed(embed: impl Into<EmbedValue>) -> Self {
        Self {
            insert: Insert::Embed(embed.into()),
            attributes: None,
        }
    }

    /// A text insert carrying this op's attributes.
    ///
    /// Used when a run is split: every fragment keeps the formatting of the
    /// run it came from.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            insert: Insert::Text(text.into()),
            attributes: self.attributes.clone(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.insert, Insert::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.insert {
            Insert::Text(text) => Some(text),
            Insert::Embed(_) => None,
        }
    }

    pub fn as_embed(&self) -> Option<&EmbedValue> {
        match &self.insert {
            Insert::Embed(embed) => Some(embed),
            Insert::Text(_) => None,
        }
    }

    /// Document length of this op: characters for text, 1 for an embed.
    pub fn length(&self) -> usize {
        match &self.insert {
            Insert::Text(text) => text.chars().count(),
            Insert::Embed(_) => 1,
        }
    }
}

/// An ordered rich-text document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Delta {
    pub ops: Vec<Op>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ops(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    /// Parse Delta JSON. Fails only on invalid JSON syntax.
    pub fn parse(json: &str) -> Result<Self, DeltaError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(Self::from_value(value))
    }

    /// Build a Delta from arbitrary JSON, degrading to empty.
    ///
    /// Accepts `{"ops": [...]}` or a bare op array. Ops that are not inserts
    /// (e.g. `retain`/`delete` from a change delta) are skipped with a warning.
    pub fn from_value(value: serde_json::Value) -> Self {
        let raw_ops = match value {
            serde_json::Value::Object(mut map) => match map.remove("ops") {
                Some(serde_json::Value::Array(ops)) => ops,
                _ => return Self::default(),
            },
            serde_json::Value::Array(ops) => ops,
            _ => return Self::default(),
        };

        let mut ops = Vec::with_capacity(raw_ops.len());
        for (index, raw) in raw_ops.into_iter().enumerate() {
            match serde_json::from_value::<Op>(raw) {
                Ok(op) => ops.push(op),
                Err(e) => tracing::warn!(index, "skipping malformed delta op: {e}"),
            }
        }
        Self { ops }
    }

    /// Compact JSON.
    pub fn to_json(&self) -> Result<String, DeltaError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Op> {
        self.ops.iter()
    }

    /// Total document length (characters plus one per embed).
    pub fn length(&self) -> usize {
        self.ops.iter().map(Op::length).sum()
    }

    /// Concatenated text of all text inserts; embeds contribute nothing.
    pub fn plain_text(&self) -> String {
        self.ops.iter().filter_map(Op::as_text).collect()
    }

    /// An editor's "empty" document: no ops, or only a single newline.
    pub fn is_blank(&self) -> bool {
        match self.ops.as_slice() {
            [] => true,
            [op] => op.as_text() == Some("\n"),
            _ => false,
        }
    }

    /// All embed payloads in document order.
    pub fn embeds(&self) -> impl Iterator<Item = &EmbedValue> {
        self.ops.iter().filter_map(Op::as_embed)
    }
}

impl<'de> Deserialize<'de> for Delta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Delta::from_value(value))
    }
}

impl FromIterator<Op> for Delta {
    fn from_iter<I: IntoIterator<Item = Op>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Delta {
    type Item = Op;
    type IntoIter = std::vec::IntoIter<Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a Delta {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_text_and_embed_ops() {
        let delta = Delta::parse(
            r#"{"ops":[{"insert":"Hi ","attributes":{"bold":true}},{"insert":{"image":"x.png"}},{"insert":"\n"}]}"#,
        )
        .unwrap();
        assert_eq!(delta.len(), 3);
        assert_eq!(delta.ops[0].as_text(), Some("Hi "));
        assert_eq!(delta.ops[0].attributes.as_ref().unwrap()["bold"], json!(true));
        assert!(delta.ops[1].as_embed().is_some());
        assert_eq!(delta.length(), 5);
        assert_eq!(delta.plain_text(), "Hi \n");
    }

    #[test]
    fn test_null_and_missing_ops_are_empty() {
        assert!(Delta::from_value(serde_json::Value::Null).is_empty());
        assert!(Delta::from_value(json!({})).is_empty());
        assert!(Delta::from_value(json!({"ops": null})).is_empty());
        assert!(Delta::from_value(json!("not a delta")).is_empty());
        assert!(Delta::parse("null").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(Delta::parse("{ops:"), Err(DeltaError::Json(_))));
    }

    #[test]
    fn test_non_insert_ops_are_skipped() {
        let delta = Delta::from_value(json!({"ops": [{"retain": 3}, {"insert": "kept"}, {"delete": 1}]}));
        assert_eq!(delta.ops, vec![Op::text("kept")]);
    }

    #[test]
    fn test_bare_op_array_is_accepted() {
        let delta = Delta::from_value(json!([{"insert": "a"}, {"insert": "b"}]));
        assert_eq!(delta.plain_text(), "ab");
    }

    #[test]
    fn test_serialization_preserves_attribute_order() {
        let json = r##"{"ops":[{"insert":"x","attributes":{"color":"#f00","bold":true,"align":"left"}}]}"##;
        let delta = Delta::parse(json).unwrap();
        assert_eq!(delta.to_json().unwrap(), json);
    }

    #[test]
    fn test_is_blank() {
        assert!(Delta::new().is_blank());
        assert!(Delta::from_ops(vec![Op::text("\n")]).is_blank());
        assert!(!Delta::from_ops(vec![Op::text("x\n")]).is_blank());
        assert!(!Delta::from_ops(vec![Op::text("\n"), Op::text("\n")]).is_blank());
    }

    #[test]
    fn test_with_text_keeps_attributes() {
        let mut attrs = Attributes::new();
        attrs.insert("italic".into(), json!(true));
        let op = Op::text_with("whole run", Some(attrs.clone()));
        let fragment = op.with_text("run");
        assert_eq!(fragment.as_text(), Some("run"));
        assert_eq!(fragment.attributes, Some(attrs));
    }
}
