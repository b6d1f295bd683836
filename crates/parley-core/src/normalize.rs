// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Part normalization: collapses backend-specific fragment conventions into
//! canonical [`ContentPart`] sequences.
//!
//! Some backends wrap their text output in `step_start`/`step_end` structural
//! markers, or split a single response across many small text fragments. The
//! stored form of a turn must contain neither: normalization drops every
//! non-text fragment and joins the remaining text exactly, in emission order.
//!
//! Only registry entries flagged `needs_normalization` route through this
//! step; all other backends' parts pass through unchanged.

use crate::types::ContentPart;

/// Normalizes a raw fragment sequence into canonical parts.
///
/// Returns exactly one `Text` part holding the exact-order, separator-free
/// concatenation of all text payloads, or an empty vec when no text survives.
/// The empty result is a defined fallback, not an error; the caller decides
/// how nothing renders.
///
/// Pure and deterministic: no I/O, no side effects.
pub fn normalize(parts: &[ContentPart]) -> Vec<ContentPart> {
    let mut joined = String::new();
    for part in parts {
        if let ContentPart::Text { text } = part {
            joined.push_str(text);
        }
    }

    if joined.is_empty() {
        Vec::new()
    } else {
        vec![ContentPart::Text { text: joined }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn structural_markers_only_yield_empty_output() {
        let parts = vec![ContentPart::StepStart, ContentPart::StepEnd];
        assert!(normalize(&parts).is_empty());
    }

    #[test]
    fn text_fragments_concatenate_without_separator() {
        let parts = vec![ContentPart::text("a"), ContentPart::text("b")];
        assert_eq!(normalize(&parts), vec![ContentPart::text("ab")]);
    }

    #[test]
    fn markers_are_stripped_around_text() {
        let parts = vec![
            ContentPart::StepStart,
            ContentPart::text("Hello, "),
            ContentPart::text("world"),
            ContentPart::StepEnd,
        ];
        assert_eq!(normalize(&parts), vec![ContentPart::text("Hello, world")]);
    }

    #[test]
    fn non_text_payload_parts_are_dropped() {
        let parts = vec![
            ContentPart::Reasoning { text: "chain of thought".into() },
            ContentPart::text("answer"),
            ContentPart::ToolResult {
                id: "t1".into(),
                name: "get_weather".into(),
                output: serde_json::json!({"temp": 17}),
            },
        ];
        assert_eq!(normalize(&parts), vec![ContentPart::text("answer")]);
    }

    #[test]
    fn all_empty_strings_yield_empty_output() {
        let parts = vec![ContentPart::text(""), ContentPart::text("")];
        assert!(normalize(&parts).is_empty());
    }

    #[test]
    fn single_part_output_is_a_fixed_point() {
        let parts = vec![
            ContentPart::StepStart,
            ContentPart::text("abc"),
            ContentPart::StepEnd,
        ];
        let once = normalize(&parts);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    fn arb_part() -> impl Strategy<Value = ContentPart> {
        prop_oneof![
            ".{0,8}".prop_map(ContentPart::text),
            ".{0,8}".prop_map(|t| ContentPart::Reasoning { text: t }),
            Just(ContentPart::StepStart),
            Just(ContentPart::StepEnd),
        ]
    }

    proptest! {
        #[test]
        fn output_preserves_exact_text_concatenation(parts in prop::collection::vec(arb_part(), 0..16)) {
            let expected: String = parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect();

            let out = normalize(&parts);
            match out.as_slice() {
                [] => prop_assert!(expected.is_empty()),
                [ContentPart::Text { text }] => prop_assert_eq!(text, &expected),
                other => prop_assert!(false, "unexpected shape: {other:?}"),
            }
        }

        #[test]
        fn normalization_is_idempotent(parts in prop::collection::vec(arb_part(), 0..16)) {
            let once = normalize(&parts);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn output_never_contains_structural_markers(parts in prop::collection::vec(arb_part(), 0..16)) {
            prop_assert!(normalize(&parts).iter().all(|p| !p.is_structural()));
        }
    }
}
