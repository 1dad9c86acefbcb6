// crates/proof-bundle-core/src/runtime/verify.rs
// ============================================================================
// Module: Proof Bundle Verifier
// Description: Offline re-verification of manifests and receipt outputs.
// Purpose: Let a third party confirm a bundle against the files on disk.
// Dependencies: crate::core, crate::runtime::{hash_engine, store}, serde
// ============================================================================

//! ## Overview
//! Verification never raises for content problems. Every discrepancy is
//! collected into a [`VerificationReport`] so an auditor sees all failures
//! at once. Tracked paths must stay inside the verification root.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::core::DigestMap;
use crate::core::Manifest;
use crate::core::Receipt;
use crate::core::compute_manifest_digest;
use crate::runtime::hash_engine::hash_file;
use crate::runtime::store::ensure_relative_path;
use crate::runtime::store::load_run_receipt;
use crate::runtime::store::receipt_file_name;

// ============================================================================
// SECTION: Verification Types
// ============================================================================

/// Verification status for bundle reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Verification succeeded.
    Pass,
    /// Verification failed.
    Fail,
}

/// Offline verification report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Verification status.
    pub status: VerificationStatus,
    /// Count of files that were read and hashed.
    pub checked_files: usize,
    /// Error messages, if any.
    pub errors: Vec<String>,
}

impl VerificationReport {
    /// Builds a report from collected errors.
    fn from_errors(checked_files: usize, errors: Vec<String>) -> Self {
        let status =
            if errors.is_empty() { VerificationStatus::Pass } else { VerificationStatus::Fail };
        Self {
            status,
            checked_files,
            errors,
        }
    }

    /// Returns true when verification passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == VerificationStatus::Pass
    }
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Re-hashes tracked files under a root directory.
#[derive(Debug, Clone)]
pub struct ManifestVerifier {
    /// Directory tracked paths resolve against.
    root: PathBuf,
}

impl ManifestVerifier {
    /// Creates a verifier rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Verifies a manifest against the files under the root.
    ///
    /// Checks the top-level digest, every tracked file digest, and that the
    /// run receipt is tracked and belongs to the manifest's run.
    #[must_use]
    pub fn verify(&self, manifest: &Manifest) -> VerificationReport {
        let mut errors = Vec::new();
        if &compute_manifest_digest(manifest.files_sha256()) != manifest.manifest_sha256() {
            errors.push("manifest digest mismatch".to_string());
        }
        let checked = self.check_digests(manifest.files_sha256(), &mut errors);
        self.check_receipt(manifest, &mut errors);
        let report = VerificationReport::from_errors(checked, errors);
        tracing::info!(
            run_id = %manifest.run_id(),
            checked_files = report.checked_files,
            errors = report.errors.len(),
            "verified manifest"
        );
        report
    }

    /// Verifies the output digests recorded in a receipt.
    #[must_use]
    pub fn verify_receipt_outputs(&self, receipt: &Receipt) -> VerificationReport {
        let mut errors = Vec::new();
        let checked = self.check_digests(receipt.outputs_sha256(), &mut errors);
        VerificationReport::from_errors(checked, errors)
    }

    /// Re-hashes each entry, returning how many files were read.
    fn check_digests(&self, digests: &DigestMap, errors: &mut Vec<String>) -> usize {
        let mut checked = 0usize;
        for (path, expected) in digests {
            if let Err(err) = ensure_relative_path(Path::new(path)) {
                errors.push(err.to_string());
                continue;
            }
            match hash_file(&self.root.join(path)) {
                Ok(actual) => {
                    checked = checked.saturating_add(1);
                    if &actual != expected {
                        errors.push(format!("hash mismatch for {path}"));
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    errors.push(format!("missing file {path}"));
                }
                Err(err) => errors.push(format!("unreadable file {path}: {err}")),
            }
        }
        checked
    }

    /// Confirms the run receipt is tracked and names the manifest's run.
    fn check_receipt(&self, manifest: &Manifest, errors: &mut Vec<String>) {
        let expected_name = receipt_file_name(manifest.run_id());
        let tracked = manifest
            .files_sha256()
            .keys()
            .find(|path| Path::new(path).file_name().is_some_and(|name| *name == *expected_name));
        let Some(path) = tracked else {
            errors.push(format!("receipt {expected_name} not tracked"));
            return;
        };
        if ensure_relative_path(Path::new(path)).is_err() {
            return;
        }
        let full = self.root.join(path);
        if !full.is_file() {
            return;
        }
        if let Err(err) = load_run_receipt(&full, manifest.run_id()) {
            errors.push(err.to_string());
        }
    }
}
