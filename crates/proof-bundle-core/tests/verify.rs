// crates/proof-bundle-core/tests/verify.rs
// ============================================================================
// Module: Verifier Tests
// Description: Tests for offline manifest and receipt verification.
// ============================================================================
//! ## Overview
//! Validates pass on untouched bundles and fail-closed reporting for
//! tampered, missing, or escaping entries.

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

use std::fs;
use std::path::Path;

use proof_bundle_core::BundleOutcome;
use proof_bundle_core::GateEvaluator;
use proof_bundle_core::Manifest;
use proof_bundle_core::ManifestVerifier;
use proof_bundle_core::MissingFilePolicy;
use proof_bundle_core::ProofBundlePipeline;
use proof_bundle_core::RunSubmission;
use proof_bundle_core::VerificationStatus;
use proof_bundle_core::compute_manifest_digest;
use proof_bundle_core::load_manifest;
use serde_json::json;

use crate::common::fixed_clock;
use crate::common::sample_settings;
use crate::common::static_env;
use crate::common::write_file;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Produces a complete bundle under `root`.
fn produce_bundle(root: &Path) -> BundleOutcome {
    write_file(root, "README.md", b"# Proof bundle\n");
    write_file(root, "outputs/metrics.json", b"{\"rmse\": 9.7}\n");
    let pipeline = ProofBundlePipeline::new(
        root,
        sample_settings(MissingFilePolicy::Fail),
        GateEvaluator::default(),
        fixed_clock(),
        static_env(),
    )
    .unwrap();
    let submission = RunSubmission {
        output_files: vec!["outputs/metrics.json".to_string()],
        packet_files: vec!["README.md".to_string()],
        ..RunSubmission::default()
    };
    pipeline.run(submission).unwrap()
}

// ============================================================================
// SECTION: Manifest Verification
// ============================================================================

/// Tests that an untouched bundle verifies.
#[test]
fn test_verify_untouched_bundle_passes() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = produce_bundle(dir.path());
    let manifest = load_manifest(&outcome.manifest_path).unwrap();

    let report = ManifestVerifier::new(dir.path()).verify(&manifest);

    assert_eq!(report.status, VerificationStatus::Pass, "{:?}", report.errors);
    assert_eq!(report.checked_files, 3);
    assert!(report.passed());
}

/// Tests that a modified file is reported.
#[test]
fn test_verify_detects_tampered_file() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = produce_bundle(dir.path());
    write_file(dir.path(), "README.md", b"# Proof bundle (edited)\n");

    let report = ManifestVerifier::new(dir.path()).verify(&outcome.manifest);

    assert_eq!(report.status, VerificationStatus::Fail);
    assert_eq!(report.errors, vec!["hash mismatch for README.md".to_string()]);
}

/// Tests that a deleted file is reported.
#[test]
fn test_verify_detects_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = produce_bundle(dir.path());
    fs::remove_file(dir.path().join("outputs/metrics.json")).unwrap();

    let report = ManifestVerifier::new(dir.path()).verify(&outcome.manifest);

    assert!(!report.passed());
    assert_eq!(report.checked_files, 2);
    assert!(report.errors.iter().any(|err| err == "missing file outputs/metrics.json"));
}

/// Tests that a manifest whose digest was not recomputed is reported.
#[test]
fn test_verify_detects_digest_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = produce_bundle(dir.path());
    let mut value = serde_json::to_value(&outcome.manifest).unwrap();
    value["manifest_sha256"] = json!("0".repeat(64));
    let forged: Manifest = serde_json::from_value(value).unwrap();

    let report = ManifestVerifier::new(dir.path()).verify(&forged);

    assert_eq!(report.errors, vec!["manifest digest mismatch".to_string()]);
}

/// Tests that tracked paths escaping the root are rejected.
#[test]
fn test_verify_rejects_escaping_paths() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("bundle");
    fs::create_dir_all(&root).unwrap();
    let outcome = produce_bundle(&root);
    write_file(dir.path(), "outside.txt", b"outside");
    let mut value = serde_json::to_value(&outcome.manifest).unwrap();
    let files = value["files_sha256"].as_object_mut().unwrap();
    files.insert(
        "../outside.txt".to_string(),
        json!(proof_bundle_core::hashing::hash_text("outside").as_str()),
    );
    let digest =
        compute_manifest_digest(&serde_json::from_value(value["files_sha256"].clone()).unwrap());
    value["manifest_sha256"] = json!(digest.as_str());
    let forged: Manifest = serde_json::from_value(value).unwrap();

    let report = ManifestVerifier::new(&root).verify(&forged);

    assert!(!report.passed());
    assert_eq!(report.checked_files, 3);
    assert!(report.errors.iter().any(|err| err.contains("escapes bundle root")));
}

// ============================================================================
// SECTION: Receipt Verification
// ============================================================================

/// Tests output verification from the receipt alone.
#[test]
fn test_verify_receipt_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = produce_bundle(dir.path());
    let verifier = ManifestVerifier::new(dir.path());

    let clean = verifier.verify_receipt_outputs(outcome.receipt.receipt());
    write_file(dir.path(), "outputs/metrics.json", b"{\"rmse\": 9.9}\n");
    let tampered = verifier.verify_receipt_outputs(outcome.receipt.receipt());

    assert!(clean.passed());
    assert_eq!(clean.checked_files, 1);
    assert_eq!(tampered.errors, vec!["hash mismatch for outputs/metrics.json".to_string()]);
}
