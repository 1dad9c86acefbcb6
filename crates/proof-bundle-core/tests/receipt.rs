// crates/proof-bundle-core/tests/receipt.rs
// ============================================================================
// Module: Receipt Builder Tests
// Description: Tests for receipt assembly and output hashing.
// ============================================================================
//! ## Overview
//! Validates pass-through of inputs and metrics, output digests, injected
//! time and environment, and failure on missing outputs.

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

use proof_bundle_core::BundleError;
use proof_bundle_core::GateResult;
use proof_bundle_core::GateStatus;
use proof_bundle_core::HashEngine;
use proof_bundle_core::MetricRecord;
use proof_bundle_core::MissingFilePolicy;
use proof_bundle_core::ReceiptBuilder;
use proof_bundle_core::ReceiptSchema;
use proof_bundle_core::RunId;
use proof_bundle_core::RunInputs;
use proof_bundle_core::hashing::hash_text;
use serde_json::json;

use crate::common::fixed_clock;
use crate::common::fixed_time;
use crate::common::static_env;
use crate::common::write_file;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns sample run inputs.
fn sample_inputs() -> RunInputs {
    let value = json!({"seed": 0, "dataset": "data/train.csv", "notes": "Demo run"});
    value.as_object().unwrap().clone()
}

/// Returns the demo run identifier.
fn run_id() -> RunId {
    RunId::parse("RUN_20240101_120000").unwrap()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Tests that a receipt records every part of the run.
#[test]
fn test_receipt_records_run() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "outputs/metrics.json", b"{\"rmse\": 9.7}\n");
    let builder = ReceiptBuilder::new(
        HashEngine::new(dir.path()),
        fixed_clock(),
        static_env(),
        MissingFilePolicy::Fail,
    );
    let gates = vec![GateResult::new("reproducible_run", GateStatus::Pass)];
    let metrics = vec![MetricRecord::new("rmse", 9.7), MetricRecord::new("rows", 120_i64)];

    let receipt = builder
        .build(run_id(), sample_inputs(), gates.clone(), metrics.clone(), &["outputs/metrics.json"])
        .unwrap();

    assert_eq!(receipt.schema_version(), ReceiptSchema::V1);
    assert_eq!(receipt.run_id(), &run_id());
    assert_eq!(receipt.created_utc(), fixed_time());
    assert_eq!(receipt.inputs(), &sample_inputs());
    assert_eq!(receipt.gates(), gates.as_slice());
    assert_eq!(receipt.metrics(), metrics.as_slice());
    assert_eq!(
        receipt.outputs_sha256().get("outputs/metrics.json"),
        Some(&hash_text("{\"rmse\": 9.7}\n"))
    );
    assert_eq!(receipt.env(), &static_env().0);
    assert!(receipt.all_gates_passed());
}

/// Tests the persisted key layout.
#[test]
fn test_receipt_json_keys() {
    let dir = tempfile::tempdir().unwrap();
    let builder = ReceiptBuilder::new(
        HashEngine::new(dir.path()),
        fixed_clock(),
        static_env(),
        MissingFilePolicy::Fail,
    );
    let receipt =
        builder.build(run_id(), RunInputs::new(), Vec::new(), Vec::new(), &[] as &[&str]).unwrap();

    let value = serde_json::to_value(&receipt).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();

    assert_eq!(
        keys,
        vec![
            "created_utc",
            "env",
            "gates",
            "inputs",
            "metrics",
            "outputs_sha256",
            "run_id",
            "schema_version"
        ]
    );
    assert_eq!(value["schema_version"], "proof-bundle.receipt/v1");
    assert_eq!(value["created_utc"], "2024-01-01T12:00:00.000000+00:00");
}

/// Tests that a missing output aborts under the fail policy.
#[test]
fn test_missing_output_fails() {
    let dir = tempfile::tempdir().unwrap();
    let builder = ReceiptBuilder::new(
        HashEngine::new(dir.path()),
        fixed_clock(),
        static_env(),
        MissingFilePolicy::Fail,
    );

    let err = builder
        .build(run_id(), RunInputs::new(), Vec::new(), Vec::new(), &["outputs/absent.csv"])
        .unwrap_err();

    assert!(matches!(err, BundleError::MissingInputFile { .. }));
}

/// Tests that a missing output is dropped under the omit policy.
#[test]
fn test_missing_output_omitted() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "present.txt", b"ok");
    let builder = ReceiptBuilder::new(
        HashEngine::new(dir.path()),
        fixed_clock(),
        static_env(),
        MissingFilePolicy::Omit,
    );

    let receipt = builder
        .build(run_id(), RunInputs::new(), Vec::new(), Vec::new(), &["present.txt", "absent.txt"])
        .unwrap();

    assert_eq!(receipt.outputs_sha256().keys().collect::<Vec<_>>(), vec!["present.txt"]);
}

/// Tests that non-finite metrics are rejected before anything is written.
#[test]
fn test_non_finite_metric_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let builder = ReceiptBuilder::new(
        HashEngine::new(dir.path()),
        fixed_clock(),
        static_env(),
        MissingFilePolicy::Fail,
    );

    let err = builder
        .build(
            run_id(),
            RunInputs::new(),
            Vec::new(),
            vec![MetricRecord::new("rmse", f64::NAN)],
            &[] as &[&str],
        )
        .unwrap_err();

    assert!(matches!(err, BundleError::SerializationFailure(_)));
}
