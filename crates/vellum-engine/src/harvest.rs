//! Save-time harvesting: fold live node state back into the Delta, collect
//! placeholder values and notes, or flatten embeds into literal text.

use std::collections::HashMap;

use vellum_types::{Delta, EmbedValue, Insert, NoteEmbed, Op, Values};

use crate::format::{EmbedNode, EmbedRegistry};
use crate::Result;

/// Copy the current contents of rendered nodes into the matching embeds.
///
/// Nodes are matched to embeds by id. Only the editable part moves across:
/// `initial_content` for placeholders, `text` for notes. Ids, labels and
/// source names always come from the Delta. Embeds with no node are kept
/// as they are.
pub fn apply_read_back<N: EmbedNode>(
    delta: &Delta,
    registry: &EmbedRegistry,
    nodes: &[N],
) -> Result<Delta> {
    let mut current: HashMap<String, EmbedValue> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        let value = registry.value(node)?;
        if let Some(id) = value.id() {
            current.insert(id.to_string(), value);
        }
    }

    let mut updated = 0usize;
    let ops = delta
        .iter()
        .map(|op| {
            let Insert::Embed(embed) = &op.insert else {
                return op.clone();
            };
            let Some(live) = embed.id().and_then(|id| current.get(id)) else {
                return op.clone();
            };
            let merged = match (embed, live) {
                (EmbedValue::EditablePlaceholder(stored), EmbedValue::EditablePlaceholder(live)) => {
                    let mut next = stored.clone();
                    next.initial_content = live.initial_content.clone();
                    EmbedValue::EditablePlaceholder(next)
                }
                (EmbedValue::Note(stored), EmbedValue::Note(live)) => {
                    let mut next = stored.clone();
                    next.text = live.text.clone();
                    EmbedValue::Note(next)
                }
                _ => return op.clone(),
            };
            updated += 1;
            Op {
                insert: Insert::Embed(merged),
                attributes: op.attributes.clone(),
            }
        })
        .collect();

    tracing::debug!(nodes = nodes.len(), updated, "applied read-back");
    Ok(Delta::from_ops(ops))
}

/// Placeholder values by name, in document order. The first embed of a name wins.
pub fn harvest_values(delta: &Delta) -> Values {
    let mut values = Values::new();
    for embed in delta.embeds().filter_map(EmbedValue::as_placeholder) {
        if embed.original_placeholder_name.is_empty() {
            continue;
        }
        values
            .entry(embed.original_placeholder_name.clone())
            .or_insert_with(|| embed.initial_content.clone());
    }
    values
}

/// All notes, in document order.
pub fn harvest_notes(delta: &Delta) -> Vec<NoteEmbed> {
    delta.embeds().filter_map(EmbedValue::as_note).cloned().collect()
}

/// Replace placeholder and note embeds with literal text.
///
/// A placeholder becomes its current content, keeping the embed op's
/// attributes; a note becomes its text on its own line. Empty results are
/// dropped. Text and opaque embeds are untouched.
pub fn flatten(delta: &Delta) -> Delta {
    delta
        .iter()
        .filter_map(|op| {
            let literal = match op.as_embed() {
                Some(EmbedValue::EditablePlaceholder(embed)) => embed.initial_content.clone(),
                Some(EmbedValue::Note(note)) if note.text.is_empty() => String::new(),
                Some(EmbedValue::Note(note)) => format!("{}\n", note.text),
                _ => return Some(op.clone()),
            };
            (!literal.is_empty()).then(|| op.with_text(literal))
        })
        .collect()
}
