// crates/proof-bundle-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared fixtures for proof bundle core tests.
// Purpose: Provide deterministic clocks, environments, and scratch files.
// Dependencies: proof-bundle-core, tempfile
// ============================================================================

//! ## Overview
//! Fixtures pin time and environment so receipts and manifests are byte
//! stable across test runs.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use proof_bundle_core::EnvironmentFingerprint;
use proof_bundle_core::FixedClock;
use proof_bundle_core::MissingFilePolicy;
use proof_bundle_core::PacketDescriptor;
use proof_bundle_core::PipelineSettings;
use proof_bundle_core::StaticEnvironment;
use proof_bundle_core::Timestamp;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// 2024-01-01T12:00:00Z.
pub const FIXED_UNIX_SECONDS: i64 = 1_704_110_400;

/// Returns a clock pinned to [`FIXED_UNIX_SECONDS`].
pub fn fixed_clock() -> FixedClock {
    FixedClock(fixed_time())
}

/// Returns the fixed timestamp.
pub fn fixed_time() -> Timestamp {
    Timestamp::from_unix_seconds(FIXED_UNIX_SECONDS).unwrap()
}

/// Returns a fixed environment fingerprint.
pub fn static_env() -> StaticEnvironment {
    StaticEnvironment(EnvironmentFingerprint {
        runtime_version: "proof-bundle-core/test".to_string(),
        platform: "test-platform".to_string(),
        executable: "/usr/bin/proof-bundle".to_string(),
        cwd: "/work".to_string(),
    })
}

/// Returns the demo packet description.
pub fn sample_packet() -> PacketDescriptor {
    PacketDescriptor {
        project_id: "PROOF_BUNDLE_DEMO".to_string(),
        packet_type: "PUBLIC".to_string(),
        version: "v0.1".to_string(),
        notes: "Proof bundle: receipts + hashes + gates.".to_string(),
    }
}

/// Returns pipeline settings matching the demo layout.
pub fn sample_settings(missing_files: MissingFilePolicy) -> PipelineSettings {
    PipelineSettings {
        packet: sample_packet(),
        run_id_prefix: "RUN".to_string(),
        default_min_improvement_frac: 0.02,
        missing_files,
        receipts_dir: "runs/receipts".into(),
        manifest_name: "MANIFEST.json".to_string(),
    }
}

/// Writes a file below `root`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, bytes: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}
