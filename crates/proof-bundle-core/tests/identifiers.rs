// crates/proof-bundle-core/tests/identifiers.rs
// ============================================================================
// Module: Identifier Tests
// Description: Tests for run identifiers and canonical timestamps.
// ============================================================================
//! ## Overview
//! Validates run id layout, ordering, parsing, and timestamp rendering.

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

use proof_bundle_core::DEFAULT_RUN_ID_PREFIX;
use proof_bundle_core::RunId;
use proof_bundle_core::RunIdError;
use proof_bundle_core::Timestamp;

// ============================================================================
// SECTION: Run Identifiers
// ============================================================================

/// Tests the generated layout.
#[test]
fn test_run_id_layout() {
    let at = Timestamp::parse("2024-01-01T12:00:00+00:00").unwrap();

    let run_id = RunId::generate(DEFAULT_RUN_ID_PREFIX, at).unwrap();

    assert_eq!(run_id.as_str(), "RUN_20240101_120000");
    assert_eq!(run_id.prefix(), "RUN");
}

/// Tests that non-UTC instants are stamped in UTC.
#[test]
fn test_run_id_uses_utc() {
    let at = Timestamp::parse("2024-01-01T14:30:05+02:00").unwrap();

    let run_id = RunId::generate("EXP", at).unwrap();

    assert_eq!(run_id.as_str(), "EXP_20240101_123005");
}

/// Tests that ids at later seconds sort later.
#[test]
fn test_run_ids_are_ordered() {
    let ids: Vec<RunId> = [1_704_110_400_i64, 1_704_110_401, 1_704_196_800]
        .iter()
        .map(|secs| RunId::generate("RUN", Timestamp::from_unix_seconds(*secs).unwrap()).unwrap())
        .collect();

    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

/// Tests prefix validation.
#[test]
fn test_run_id_prefix_validation() {
    let at = Timestamp::from_unix_seconds(0).unwrap();

    assert!(RunId::generate("ok_prefix-1", at).is_ok());
    assert_eq!(RunId::generate("", at).unwrap_err(), RunIdError::Prefix(String::new()));
    assert!(matches!(RunId::generate("bad prefix", at), Err(RunIdError::Prefix(_))));
    assert!(matches!(RunId::generate(&"x".repeat(65), at), Err(RunIdError::Prefix(_))));
}

/// Tests parsing of well-formed and malformed ids.
#[test]
fn test_run_id_parse() {
    assert_eq!(RunId::parse("RUN_20240101_120000").unwrap().prefix(), "RUN");
    assert_eq!(RunId::parse("A_B_20240101_120000").unwrap().prefix(), "A_B");
    assert!(matches!(RunId::parse("RUN_2024010_1200000"), Err(RunIdError::Format(_))));
    assert!(matches!(RunId::parse("RUN-20240101_120000"), Err(RunIdError::Format(_))));
    assert!(matches!(RunId::parse("RUN_20241301_120000"), Err(RunIdError::Stamp(_))));
    assert!(RunId::parse("short").is_err());
    assert!(RunId::parse("é_20240101_12000é").is_err());
}

/// Tests serde round trip through the string form.
#[test]
fn test_run_id_serde_rejects_invalid() {
    let parsed: RunId = serde_json::from_str("\"RUN_20240101_120000\"").unwrap();
    assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"RUN_20240101_120000\"");
    assert!(serde_json::from_str::<RunId>("\"not-a-run\"").is_err());
}

// ============================================================================
// SECTION: Timestamps
// ============================================================================

/// Tests the canonical rendering.
#[test]
fn test_timestamp_canonical_form() {
    let at = Timestamp::from_unix_seconds(1_704_110_400).unwrap();

    assert_eq!(at.to_canonical_string().unwrap(), "2024-01-01T12:00:00.000000+00:00");
    assert_eq!(serde_json::to_string(&at).unwrap(), "\"2024-01-01T12:00:00.000000+00:00\"");
}

/// Tests that offsets normalize to UTC and text round trips.
#[test]
fn test_timestamp_parse_normalizes_offset() {
    let at = Timestamp::parse("2024-01-01T13:00:00.123456789+01:00").unwrap();

    let text = at.to_canonical_string().unwrap();

    assert_eq!(text, "2024-01-01T12:00:00.123456+00:00");
    assert_eq!(Timestamp::parse(&text).unwrap(), at);
}
