//! Template and proposal records.
//!
//! A template is what an admin authors: named, described, a list of ordered
//! content sections and the placeholder definitions found in them. A proposal
//! is what an end user produces from one.

use std::borrow::Cow;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::delta::{Delta, Op};
use crate::ids::{ProposalId, TemplateId};
use crate::placeholder::PlaceholderDefinition;

/// Template validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("template name is required")]
    MissingName,
    #[error("template has no quill_delta section")]
    NoDeltaSection,
    #[error("template section {order} has no content")]
    EmptyContent { order: u32 },
    #[error("section {order}: html content must be a string")]
    InvalidHtml { order: u32 },
}

/// How a section's content is encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    QuillDelta,
    Html,
}

/// Section body, typed by [`ContentType`].
#[derive(Clone, Debug, PartialEq)]
pub enum SectionContent {
    Delta(Delta),
    Html(String),
}

impl SectionContent {
    pub fn content_type(&self) -> ContentType {
        match self {
            SectionContent::Delta(_) => ContentType::QuillDelta,
            SectionContent::Html(_) => ContentType::Html,
        }
    }
}

/// One ordered section of a template or proposal.
///
/// Wire shape: `{"order": 0, "content_type": "quill_delta", "content": {...}}`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawSection")]
pub struct TemplateSection {
    pub order: u32,
    pub content: SectionContent,
}

#[derive(Deserialize)]
struct RawSection {
    #[serde(default)]
    order: u32,
    content_type: ContentType,
    #[serde(default)]
    content: serde_json::Value,
}

impl TryFrom<RawSection> for TemplateSection {
    type Error = TemplateError;

    fn try_from(raw: RawSection) -> Result<Self, Self::Error> {
        let content = match raw.content_type {
            ContentType::QuillDelta => SectionContent::Delta(Delta::from_value(raw.content)),
            ContentType::Html => match raw.content {
                serde_json::Value::String(html) => SectionContent::Html(html),
                serde_json::Value::Null => SectionContent::Html(String::new()),
                _ => return Err(TemplateError::InvalidHtml { order: raw.order }),
            },
        };
        Ok(Self {
            order: raw.order,
            content,
        })
    }
}

impl Serialize for TemplateSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("TemplateSection", 3)?;
        s.serialize_field("order", &self.order)?;
        s.serialize_field("content_type", &self.content.content_type())?;
        match &self.content {
            SectionContent::Delta(delta) => s.serialize_field("content", delta)?,
            SectionContent::Html(html) => s.serialize_field("content", html)?,
        }
        s.end()
    }
}

impl TemplateSection {
    pub fn delta(order: u32, delta: Delta) -> Self {
        Self {
            order,
            content: SectionContent::Delta(delta),
        }
    }

    pub fn html(order: u32, html: impl Into<String>) -> Self {
        Self {
            order,
            content: SectionContent::Html(html.into()),
        }
    }

    pub fn as_delta(&self) -> Option<&Delta> {
        match &self.content {
            SectionContent::Delta(delta) => Some(delta),
            SectionContent::Html(_) => None,
        }
    }

    /// The section as a Delta. HTML becomes a single text insert of its
    /// markup; empty HTML becomes an empty Delta.
    pub fn body_delta(&self) -> Cow<'_, Delta> {
        match &self.content {
            SectionContent::Delta(delta) => Cow::Borrowed(delta),
            SectionContent::Html(html) if html.is_empty() => Cow::Owned(Delta::new()),
            SectionContent::Html(html) => Cow::Owned(Delta::from_ops(vec![Op::text(html.as_str())])),
        }
    }
}

/// Sort sections by `order`, keeping stored order for ties.
fn ordered(sections: &[TemplateSection]) -> Vec<&TemplateSection> {
    let mut sorted: Vec<&TemplateSection> = sections.iter().collect();
    sorted.sort_by_key(|s| s.order);
    sorted
}

/// A stored proposal template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Storage id. Absent for templates that were never saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TemplateId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<TemplateSection>,
    #[serde(default)]
    pub placeholders: Vec<PlaceholderDefinition>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Template {
    /// A template with a single Delta section.
    pub fn new(name: impl Into<String>, content: Delta) -> Self {
        Self {
            id: Some(TemplateId::new()),
            name: name.into(),
            description: String::new(),
            sections: vec![TemplateSection::delta(0, content)],
            placeholders: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Sections sorted by `order`.
    pub fn sections_ordered(&self) -> Vec<&TemplateSection> {
        ordered(&self.sections)
    }

    /// Stable key for deriving embed ids: the id when stored, else the name.
    pub fn id_scope(&self) -> String {
        match &self.id {
            Some(id) => id.to_hex(),
            None => format!("template:{}", self.name),
        }
    }

    /// Every section as a Delta, in `order`.
    pub fn bodies(&self) -> impl Iterator<Item = Cow<'_, Delta>> {
        self.sections_ordered().into_iter().map(TemplateSection::body_delta)
    }

    /// Checks required before a template may be saved.
    ///
    /// The name must not be blank, there must be at least one Delta section,
    /// and no Delta section may be blank (empty or a lone `"\n"`).
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.name.trim().is_empty() {
            return Err(TemplateError::MissingName);
        }
        let mut has_delta = false;
        for section in self.sections_ordered() {
            if let Some(delta) = section.as_delta() {
                has_delta = true;
                if delta.is_blank() {
                    return Err(TemplateError::EmptyContent {
                        order: section.order,
                    });
                }
            }
        }
        if !has_delta {
            return Err(TemplateError::NoDeltaSection);
        }
        Ok(())
    }
}

/// A proposal composed from a template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    pub sections: Vec<TemplateSection>,
}

impl Proposal {
    /// Sections sorted by `order`.
    pub fn sections_ordered(&self) -> Vec<&TemplateSection> {
        ordered(&self.sections)
    }
}
