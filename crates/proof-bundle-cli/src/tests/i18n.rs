// crates/proof-bundle-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Unit tests for the message catalog and placeholder handling.
// Purpose: Ensure catalog lookups stay stable and well-formed.
// Dependencies: proof-bundle-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies catalog keys are unique, placeholders substitute, and unknown
//! keys fall back to the key text.

use std::collections::BTreeSet;

use crate::i18n::CATALOG_ITEMS;
use crate::i18n::MessageArg;
use crate::i18n::translate;

#[test]
fn catalog_keys_are_unique() {
    let keys: BTreeSet<&str> = CATALOG_ITEMS.iter().map(|(key, _)| *key).collect();
    assert_eq!(keys.len(), CATALOG_ITEMS.len(), "duplicate catalog keys");
}

#[test]
fn catalog_placeholders_are_balanced() {
    for (key, template) in CATALOG_ITEMS {
        let opens = template.matches('{').count();
        let closes = template.matches('}').count();
        assert_eq!(opens, closes, "unbalanced placeholders in {key}");
    }
}

#[test]
fn translate_substitutes_placeholders() {
    let output = translate(
        "input.read_too_large",
        vec![
            MessageArg::new("kind", "run submission"),
            MessageArg::new("path", "submission.json"),
            MessageArg::new("size", "20"),
            MessageArg::new("limit", "10"),
        ],
    );
    assert_eq!(
        output,
        "Refusing to read run submission at submission.json because it is 20 bytes (limit 10)."
    );
}

#[test]
fn translate_falls_back_to_key() {
    assert_eq!(translate("missing.key", Vec::new()), "missing.key");
}

#[test]
fn macro_formats_named_arguments() {
    let output = crate::t!("verify.md.checked", count = 3);
    assert_eq!(output, "- Checked files: 3");
}
