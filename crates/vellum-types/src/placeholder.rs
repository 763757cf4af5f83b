//! Placeholder definitions declared by template metadata.

use serde::{Deserialize, Serialize};

/// Caller-supplied values keyed by placeholder name, in insertion order.
pub type Values = indexmap::IndexMap<String, String>;

/// One named `{{NAME}}` slot of a template.
///
/// `name` is the case-sensitive match key, used verbatim between the braces.
/// Its characters are always matched literally.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Stable embed id to use instead of a generated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl PlaceholderDefinition {
    /// A definition with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The token this definition matches, e.g. `{{CLIENT_NAME}}`.
    pub fn token(&self) -> String {
        format!("{{{{{}}}}}", self.name)
    }

    /// Description, if present and non-empty.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}
