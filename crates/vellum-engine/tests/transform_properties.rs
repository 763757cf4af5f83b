//! Property tests for the transformer: identity, lossless coverage,
//! structure preservation and idempotence over generated documents.

use proptest::prelude::*;
use serde_json::json;
use vellum_engine::transform;
use vellum_types::{Attributes, Delta, EmbedValue, Insert, Op, PlaceholderDefinition, Values};

const NAMES: &[&str] = &["A", "AB", "CLIENT", "CLIENT_NAME", "x.y"];

// -- Strategy helpers --

/// Text mixing literal noise (including stray braces) with `{{NAME}}` tokens.
fn arb_text() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        "[a-z {}._]{0,6}",
        prop::sample::select(NAMES).prop_map(|n| format!("{{{{{n}}}}}")),
        prop::sample::select(NAMES).prop_map(|n| format!("{{{{{n}}}")),
    ];
    prop::collection::vec(piece, 0..6).prop_map(|pieces| pieces.concat())
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (arb_text(), any::<bool>()).prop_map(|(text, bold)| {
            let attributes = bold.then(|| {
                let mut attrs = Attributes::new();
                attrs.insert("bold".into(), json!(true));
                attrs
            });
            Op::text_with(text, attributes)
        }),
        1 => "[a-z]{1,4}".prop_map(|src| Op::embed(EmbedValue::Other(json!({"image": src})))),
    ]
}

fn arb_delta() -> impl Strategy<Value = Delta> {
    prop::collection::vec(arb_op(), 0..8).prop_map(Delta::from_ops)
}

fn arb_defs() -> impl Strategy<Value = Vec<PlaceholderDefinition>> {
    prop::sample::subsequence(NAMES, 0..=NAMES.len())
        .prop_map(|names| names.into_iter().map(PlaceholderDefinition::new).collect())
}

/// Render a delta back to token text: placeholders as `{{NAME}}`, other
/// embeds as a marker that cannot occur in generated text.
fn reconstruct(delta: &Delta) -> String {
    delta
        .iter()
        .map(|op| match &op.insert {
            Insert::Text(text) => text.clone(),
            Insert::Embed(EmbedValue::EditablePlaceholder(e)) => {
                format!("{{{{{}}}}}", e.original_placeholder_name)
            }
            Insert::Embed(_) => "\u{fffc}".to_string(),
        })
        .collect()
}

fn opaque_count(delta: &Delta) -> usize {
    delta.embeds().filter(|e| e.kind().is_none()).count()
}

proptest! {
    #[test]
    fn empty_definitions_are_identity(delta in arb_delta()) {
        prop_assert_eq!(transform(&delta, &[], &Values::new()), delta);
    }

    #[test]
    fn every_character_is_accounted_for(delta in arb_delta(), defs in arb_defs()) {
        let out = transform(&delta, &defs, &Values::new());
        prop_assert_eq!(reconstruct(&out), reconstruct(&delta));
    }

    #[test]
    fn non_text_ops_are_preserved_in_order(delta in arb_delta(), defs in arb_defs()) {
        let out = transform(&delta, &defs, &Values::new());
        prop_assert_eq!(opaque_count(&out), opaque_count(&delta));
        let before: Vec<&EmbedValue> = delta.embeds().collect();
        let after: Vec<&EmbedValue> = out.embeds().filter(|e| e.kind().is_none()).collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn fragments_keep_source_attributes(delta in arb_delta(), defs in arb_defs()) {
        let out = transform(&delta, &defs, &Values::new());
        let bold_in: usize = delta.iter().filter(|op| op.attributes.is_some()).map(|op| op.length()).sum();
        let bold_out_text: usize = out
            .iter()
            .filter(|op| op.is_text() && op.attributes.is_some())
            .map(|op| op.length())
            .sum();
        // Only whole tokens leave a bold run, so bold text can shrink but never grow.
        prop_assert!(bold_out_text <= bold_in);
    }

    #[test]
    fn transform_is_idempotent(delta in arb_delta(), defs in arb_defs()) {
        let once = transform(&delta, &defs, &Values::new());
        let twice = transform(&once, &defs, &Values::new());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn embed_ids_are_unique(delta in arb_delta(), defs in arb_defs()) {
        let out = transform(&delta, &defs, &Values::new());
        let ids: Vec<&str> = out.embeds().filter_map(EmbedValue::id).collect();
        let unique: std::collections::HashSet<&&str> = ids.iter().collect();
        prop_assert_eq!(unique.len(), ids.len());
    }
}
