// crates/proof-bundle-core/tests/manifest.rs
// ============================================================================
// Module: Manifest Builder Tests
// Description: Tests for manifest assembly and the top-level digest.
// ============================================================================
//! ## Overview
//! Validates the receipt chain, order invariance, and tamper sensitivity.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::path::Path;

use proof_bundle_core::BundleStore;
use proof_bundle_core::DigestMap;
use proof_bundle_core::FixedClock;
use proof_bundle_core::HashEngine;
use proof_bundle_core::ManifestBuilder;
use proof_bundle_core::ManifestSchema;
use proof_bundle_core::MissingFilePolicy;
use proof_bundle_core::PersistedReceipt;
use proof_bundle_core::ReceiptBuilder;
use proof_bundle_core::RunId;
use proof_bundle_core::RunInputs;
use proof_bundle_core::compute_manifest_digest;
use proof_bundle_core::manifest_digest_text;
use proof_bundle_core::hashing::hash_text;

use crate::common::fixed_clock;
use crate::common::fixed_time;
use crate::common::sample_packet;
use crate::common::static_env;
use crate::common::write_file;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes packet files and a persisted receipt under `root`.
fn persisted_receipt(root: &Path) -> PersistedReceipt {
    write_file(root, "README.md", b"# Proof bundle\n");
    write_file(root, "docs/method.md", b"method\n");
    let receipt = ReceiptBuilder::new(
        HashEngine::new(root),
        fixed_clock(),
        static_env(),
        MissingFilePolicy::Fail,
    )
    .build(
        RunId::parse("RUN_20240101_120000").unwrap(),
        RunInputs::new(),
        Vec::new(),
        Vec::new(),
        &[] as &[&str],
    )
    .unwrap();
    BundleStore::new(root)
        .unwrap()
        .persist_receipt(receipt, Path::new("runs/receipts/receipt_RUN_20240101_120000.json"))
        .unwrap()
}

/// Returns a manifest builder rooted at `root`.
fn builder(root: &Path) -> ManifestBuilder<FixedClock> {
    ManifestBuilder::new(HashEngine::new(root), fixed_clock(), MissingFilePolicy::Fail)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Tests that the receipt is always tracked and the run id is taken from it.
#[test]
fn test_manifest_chains_receipt() {
    let dir = tempfile::tempdir().unwrap();
    let receipt = persisted_receipt(dir.path());

    let manifest = builder(dir.path()).build(&sample_packet(), &receipt, &["README.md"]).unwrap();

    assert_eq!(manifest.schema_version(), ManifestSchema::V1);
    assert_eq!(manifest.run_id(), receipt.run_id());
    assert_eq!(manifest.packet().generated_utc, fixed_time());
    assert_eq!(manifest.packet().project_id, "PROOF_BUNDLE_DEMO");
    assert!(manifest.files_sha256().contains_key(receipt.path()));
    assert!(manifest.files_sha256().contains_key("README.md"));
    assert_eq!(manifest.files_sha256().len(), 2);
}

/// Tests that the top-level digest is the hash of the rendered file map.
#[test]
fn test_manifest_digest_rule() {
    let dir = tempfile::tempdir().unwrap();
    let receipt = persisted_receipt(dir.path());

    let manifest = builder(dir.path()).build(&sample_packet(), &receipt, &["README.md"]).unwrap();

    let expected = hash_text(&manifest_digest_text(manifest.files_sha256()));
    assert_eq!(manifest.manifest_sha256(), &expected);
    assert_eq!(manifest.manifest_sha256(), &compute_manifest_digest(manifest.files_sha256()));
}

/// Tests the digest text against a key-sorted `json.dumps` rendering.
#[test]
fn test_manifest_digest_matches_sorted_json_dumps() {
    let mut files = DigestMap::new();
    files.insert("receipts/RUN_20240101_120000.json".to_string(), hash_text("b"));
    files.insert("README.md".to_string(), hash_text("a"));

    assert_eq!(
        manifest_digest_text(&files),
        "{\"README.md\": \"ca978112ca1bbdcafac231b39a23dc4da786eff8147c4e72b9807785afee48bb\", \
         \"receipts/RUN_20240101_120000.json\": \
         \"3e23e8160039594a33894f6564e1b1348bbd7a0088d42c4acb73eeaed59c009d\"}"
    );
    assert_eq!(
        compute_manifest_digest(&files).as_str(),
        "90e7c93a8ec5971fc278b3b424811c4e5d876c7bf3e808bf02588e22d99f2dde"
    );
}

/// Tests that non-ASCII and control characters use ASCII escapes.
#[test]
fn test_manifest_digest_escapes_non_ascii_paths() {
    let mut files = DigestMap::new();
    files.insert("docs/caf\u{e9} \"q\"\\\t\u{7f}\u{1f600}.md".to_string(), hash_text("a"));

    assert_eq!(
        manifest_digest_text(&files),
        "{\"docs/caf\\u00e9 \\\"q\\\"\\\\\\t\\u007f\\ud83d\\ude00.md\": \
         \"ca978112ca1bbdcafac231b39a23dc4da786eff8147c4e72b9807785afee48bb\"}"
    );
    assert_eq!(
        compute_manifest_digest(&files).as_str(),
        "b5860d0b183f42c8c4cb3e73d21a0133379379123ea2f0b7a763935b409bc706"
    );
}

/// Tests the digest of an empty file map.
#[test]
fn test_manifest_digest_of_empty_map() {
    assert_eq!(manifest_digest_text(&DigestMap::new()), "{}");
    assert_eq!(
        compute_manifest_digest(&DigestMap::new()).as_str(),
        "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
    );
}

/// Tests that reordering the file list leaves the digest unchanged.
#[test]
fn test_manifest_digest_ignores_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let receipt = persisted_receipt(dir.path());
    let builder = builder(dir.path());

    let first =
        builder.build(&sample_packet(), &receipt, &["README.md", "docs/method.md"]).unwrap();
    let second =
        builder.build(&sample_packet(), &receipt, &["docs/method.md", "README.md"]).unwrap();

    assert_eq!(first.manifest_sha256(), second.manifest_sha256());
}

/// Tests that changing a tracked file changes the digest.
#[test]
fn test_manifest_digest_detects_changes() {
    let dir = tempfile::tempdir().unwrap();
    let receipt = persisted_receipt(dir.path());
    let builder = builder(dir.path());
    let before = builder.build(&sample_packet(), &receipt, &["docs/method.md"]).unwrap();

    write_file(dir.path(), "docs/method.md", b"method!\n");
    let after = builder.build(&sample_packet(), &receipt, &["docs/method.md"]).unwrap();

    assert_ne!(before.manifest_sha256(), after.manifest_sha256());
}

/// Tests the packet `type` key and the top-level key layout.
#[test]
fn test_manifest_json_layout() {
    let dir = tempfile::tempdir().unwrap();
    let receipt = persisted_receipt(dir.path());

    let manifest = builder(dir.path()).build(&sample_packet(), &receipt, &[] as &[&str]).unwrap();
    let value = serde_json::to_value(&manifest).unwrap();

    assert_eq!(value["schema_version"], "proof-bundle.manifest/v1");
    assert_eq!(value["packet"]["type"], "PUBLIC");
    assert_eq!(value["run_id"], "RUN_20240101_120000");
    assert!(value["manifest_sha256"].is_string());
}
