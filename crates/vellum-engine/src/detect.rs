//! Placeholder detection: authored text → definitions.
//!
//! When an author types raw `{{NAME}}` tokens into a template, they must be
//! registered as placeholders at save time. Detection accepts names made of
//! ASCII letters, digits, `_` and spaces.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use vellum_types::{Delta, PlaceholderDefinition};

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_ ]+)\}\}").expect("static token pattern"));

/// Description synthesized for a detected placeholder.
pub fn default_description(name: &str) -> String {
    format!("Value for {name}")
}

/// Find every distinct placeholder name in `delta`, in first-seen order.
///
/// Only text inserts are scanned; embeds are opaque. Names are case-sensitive.
pub fn detect(delta: &Delta) -> Vec<PlaceholderDefinition> {
    detect_all([delta])
}

/// [`detect`] across several deltas (e.g. all sections of a template), with
/// one shared first-seen order.
pub fn detect_all<'a>(deltas: impl IntoIterator<Item = &'a Delta>) -> Vec<PlaceholderDefinition> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut found = Vec::new();

    for delta in deltas {
        for text in delta.iter().filter_map(|op| op.as_text()) {
            for caps in TOKEN.captures_iter(text) {
                let Some(name) = caps.get(1).map(|m| m.as_str()) else {
                    continue;
                };
                if seen.insert(name) {
                    found.push(
                        PlaceholderDefinition::new(name).with_description(default_description(name)),
                    );
                }
            }
        }
    }

    tracing::debug!(count = found.len(), "detected placeholders");
    found
}

/// Reconcile freshly detected definitions with the ones already stored.
///
/// Output order is detection order. For names that were already defined the
/// stored definition is kept (author-supplied description, default and id
/// survive a re-save); names whose token disappeared are dropped.
pub fn merge_definitions(
    detected: Vec<PlaceholderDefinition>,
    existing: &[PlaceholderDefinition],
) -> Vec<PlaceholderDefinition> {
    detected
        .into_iter()
        .map(|found| {
            existing
                .iter()
                .find(|old| old.name == found.name)
                .cloned()
                .unwrap_or(found)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_types::{EditablePlaceholderEmbed, Op};

    fn names(defs: &[PlaceholderDefinition]) -> Vec<&str> {
        defs.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_first_seen_order_and_dedup() {
        let delta = Delta::from_ops(vec![Op::text("{{A}} and {{B}} and {{A}}")]);
        let found = detect(&delta);
        assert_eq!(names(&found), vec!["A", "B"]);
        assert_eq!(found[0].description.as_deref(), Some("Value for A"));
    }

    #[test]
    fn test_spaces_allowed_punctuation_not() {
        let delta = Delta::from_ops(vec![Op::text("{{Start Date}} {{a.b}} {{}} {{x-y}}")]);
        assert_eq!(names(&detect(&delta)), vec!["Start Date"]);
    }

    #[test]
    fn test_case_sensitive_names() {
        let delta = Delta::from_ops(vec![Op::text("{{name}} {{NAME}}")]);
        assert_eq!(names(&detect(&delta)), vec!["name", "NAME"]);
    }

    #[test]
    fn test_embeds_are_not_scanned() {
        let embed = EditablePlaceholderEmbed::new("1", "{{HIDDEN}}", "{{HIDDEN}}", "HIDDEN");
        let delta = Delta::from_ops(vec![Op::embed(embed), Op::text("{{SHOWN}}")]);
        assert_eq!(names(&detect(&delta)), vec!["SHOWN"]);
    }

    #[test]
    fn test_tokens_split_across_ops_are_not_joined() {
        let delta = Delta::from_ops(vec![Op::text("{{CLI"), Op::text("ENT}}")]);
        assert!(detect(&delta).is_empty());
    }

    #[test]
    fn test_detect_all_shares_order_across_sections() {
        let a = Delta::from_ops(vec![Op::text("{{B}}")]);
        let b = Delta::from_ops(vec![Op::text("{{A}} {{B}}")]);
        assert_eq!(names(&detect_all([&a, &b])), vec!["B", "A"]);
    }

    #[test]
    fn test_merge_keeps_author_fields_and_drops_stale() {
        let existing = vec![
            PlaceholderDefinition::new("A").with_description("Client").with_default("Acme").with_id("ph-a"),
            PlaceholderDefinition::new("GONE"),
        ];
        let detected = vec![
            PlaceholderDefinition::new("B").with_description(default_description("B")),
            PlaceholderDefinition::new("A").with_description(default_description("A")),
        ];
        let merged = merge_definitions(detected, &existing);
        assert_eq!(names(&merged), vec!["B", "A"]);
        assert_eq!(merged[1], existing[0]);
        assert_eq!(merged[0].description.as_deref(), Some("Value for B"));
    }
}
