//! Delta → Delta placeholder transformation.
//!
//! Every `{{NAME}}` token in a text insert whose name has a definition is cut
//! out of its run and replaced by an `editable-placeholder` embed. The text
//! around it is re-emitted as separate inserts with the run's original
//! attributes. Runs without a token, and every embed, are copied through
//! untouched, so running the transform over its own output changes nothing.

use std::collections::HashMap;

use vellum_types::{Delta, EditablePlaceholderEmbed, Op, PlaceholderDefinition, Values};

use crate::ids::{IdAllocator, IdStrategy};
use crate::matcher::PlaceholderMatcher;

/// Label used when a definition has no description. `{name}` is substituted.
pub const DEFAULT_LABEL_FORMAT: &str = "Edit {name}:";

/// Configured placeholder transformer.
///
/// Holds no per-document state; each call gets a fresh [`IdAllocator`] unless
/// the caller passes one to [`Transformer::transform_with`].
#[derive(Clone, Debug, Default)]
pub struct Transformer {
    id_strategy: IdStrategy,
    label_format: Option<String>,
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    /// Override the fallback label. `{name}` is replaced by the placeholder name.
    pub fn with_label_format(mut self, label_format: impl Into<String>) -> Self {
        self.label_format = Some(label_format.into());
        self
    }

    pub fn id_strategy(&self) -> &IdStrategy {
        &self.id_strategy
    }

    /// A fresh allocator for one document.
    pub fn allocator(&self) -> IdAllocator {
        IdAllocator::new(self.id_strategy.clone())
    }

    /// Transform one document.
    pub fn transform(
        &self,
        delta: &Delta,
        placeholders: &[PlaceholderDefinition],
        initial_values: &Values,
    ) -> Delta {
        let mut ids = self.allocator();
        self.transform_with(delta, placeholders, initial_values, &mut ids)
    }

    /// Transform with caller-owned id state, so ids stay unique across
    /// several deltas that end up in the same document.
    pub fn transform_with(
        &self,
        delta: &Delta,
        placeholders: &[PlaceholderDefinition],
        initial_values: &Values,
        ids: &mut IdAllocator,
    ) -> Delta {
        let Some(matcher) = PlaceholderMatcher::new(placeholders.iter().map(|p| p.name.as_str()))
        else {
            return delta.clone();
        };

        // First definition wins if a name is declared twice.
        let mut definitions: HashMap<&str, &PlaceholderDefinition> = HashMap::new();
        for def in placeholders {
            definitions.entry(def.name.as_str()).or_insert(def);
        }

        let mut ops = Vec::with_capacity(delta.len());
        let mut replaced = 0usize;

        for op in delta {
            let Some(text) = op.as_text() else {
                ops.push(op.clone());
                continue;
            };

            let mut last = 0;
            let mut matched = false;
            for token in matcher.find_iter(text) {
                matched = true;
                if token.range.start > last {
                    ops.push(op.with_text(&text[last..token.range.start]));
                }
                let embed = self.build_embed(
                    token.name,
                    definitions.get(token.name).copied(),
                    initial_values,
                    ids,
                );
                tracing::trace!(name = token.name, id = %embed.id, "placeholder replaced");
                ops.push(Op::embed(embed));
                replaced += 1;
                last = token.range.end;
            }

            if !matched {
                ops.push(op.clone());
            } else if last < text.len() {
                ops.push(op.with_text(&text[last..]));
            }
        }

        tracing::debug!(
            ops_in = delta.len(),
            ops_out = ops.len(),
            replaced,
            "placeholder transform"
        );
        Delta::from_ops(ops)
    }

    fn build_embed(
        &self,
        name: &str,
        definition: Option<&PlaceholderDefinition>,
        initial_values: &Values,
        ids: &mut IdAllocator,
    ) -> EditablePlaceholderEmbed {
        let explicit = initial_values.get(name).cloned();
        match definition {
            Some(def) => EditablePlaceholderEmbed::new(
                ids.next_id(name, def.id.as_deref()),
                def.description()
                    .map(str::to_string)
                    .unwrap_or_else(|| self.fallback_label(name)),
                explicit
                    .or_else(|| def.default_value.clone())
                    .unwrap_or_default(),
                name,
            ),
            None => {
                tracing::warn!(name, "matched placeholder has no definition");
                EditablePlaceholderEmbed::new(
                    ids.next_id(name, None),
                    name,
                    explicit.unwrap_or_else(|| name.to_string()),
                    name,
                )
            }
        }
    }

    fn fallback_label(&self, name: &str) -> String {
        self.label_format
            .as_deref()
            .unwrap_or(DEFAULT_LABEL_FORMAT)
            .replace("{name}", name)
    }
}

/// Transform with default settings (timestamped ids, `"Edit NAME:"` labels).
pub fn transform(
    delta: &Delta,
    placeholders: &[PlaceholderDefinition],
    initial_values: &Values,
) -> Delta {
    Transformer::default().transform(delta, placeholders, initial_values)
}
