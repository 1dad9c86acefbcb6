// crates/proof-bundle-core/src/runtime/manifest.rs
// ============================================================================
// Module: Proof Bundle Manifest Builder
// Description: Package-level manifest assembly over tracked files.
// Purpose: Chain a persisted receipt and packet files under one digest.
// Dependencies: crate::{core, interfaces}, crate::runtime::{hash_engine, store}
// ============================================================================

//! ## Overview
//! A manifest can only be built from a [`PersistedReceipt`], so the receipt
//! is always on disk before it is hashed. The receipt path is added to the
//! tracked set unconditionally and the run identifier is taken from it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use crate::core::Manifest;
use crate::core::PacketDescriptor;
use crate::core::PacketInfo;
use crate::interfaces::Clock;
use crate::runtime::error::BundleError;
use crate::runtime::hash_engine::HashEngine;
use crate::runtime::hash_engine::MissingFilePolicy;
use crate::runtime::store::PersistedReceipt;

// ============================================================================
// SECTION: Manifest Builder
// ============================================================================

/// Builds manifests with an injected clock.
#[derive(Debug, Clone)]
pub struct ManifestBuilder<C> {
    /// Hash engine for tracked files.
    engine: HashEngine,
    /// Time source for `generated_utc`.
    clock: C,
    /// Handling for missing tracked files.
    missing_files: MissingFilePolicy,
}

impl<C: Clock> ManifestBuilder<C> {
    /// Creates a manifest builder.
    #[must_use]
    pub const fn new(engine: HashEngine, clock: C, missing_files: MissingFilePolicy) -> Self {
        Self {
            engine,
            clock,
            missing_files,
        }
    }

    /// Builds the manifest for a persisted receipt and additional files.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError`] when a tracked file cannot be hashed under the
    /// builder's missing-file policy or the digest cannot be computed.
    pub fn build<P: AsRef<Path>>(
        &self,
        packet: &PacketDescriptor,
        receipt: &PersistedReceipt,
        files: &[P],
    ) -> Result<Manifest, BundleError> {
        let mut tracked: Vec<PathBuf> =
            files.iter().map(|path| path.as_ref().to_path_buf()).collect();
        tracked.push(PathBuf::from(receipt.path()));
        let files_sha256 =
            self.engine.hash_file_set(tracked.as_slice()).resolve(self.missing_files)?;
        let info = PacketInfo {
            project_id: packet.project_id.clone(),
            packet_type: packet.packet_type.clone(),
            version: packet.version.clone(),
            generated_utc: self.clock.now(),
            notes: packet.notes.clone(),
        };
        let manifest = Manifest::assemble(info, receipt.run_id().clone(), files_sha256);
        tracing::debug!(
            run_id = %manifest.run_id(),
            files = manifest.files_sha256().len(),
            manifest_sha256 = %manifest.manifest_sha256(),
            "built manifest"
        );
        Ok(manifest)
    }
}
