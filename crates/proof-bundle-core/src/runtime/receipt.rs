// crates/proof-bundle-core/src/runtime/receipt.rs
// ============================================================================
// Module: Proof Bundle Receipt Builder
// Description: Assembles per-run receipts from run results.
// Purpose: Bind inputs, gates, metrics, and output digests into one record.
// Dependencies: crate::{core, interfaces}, crate::runtime::hash_engine
// ============================================================================

//! ## Overview
//! The builder hashes declared output files through the [`HashEngine`],
//! stamps the receipt with the injected [`Clock`], and records the injected
//! environment fingerprint. Inputs and metrics pass through unchanged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use crate::core::GateResult;
use crate::core::MetricRecord;
use crate::core::Receipt;
use crate::core::RunId;
use crate::core::RunInputs;
use crate::interfaces::Clock;
use crate::interfaces::EnvironmentProbe;
use crate::runtime::error::BundleError;
use crate::runtime::hash_engine::HashEngine;
use crate::runtime::hash_engine::MissingFilePolicy;

// ============================================================================
// SECTION: Receipt Builder
// ============================================================================

/// Builds receipts with injected time and environment sources.
#[derive(Debug, Clone)]
pub struct ReceiptBuilder<C, E> {
    /// Hash engine for output files.
    engine: HashEngine,
    /// Time source for `created_utc`.
    clock: C,
    /// Environment fingerprint source.
    environment: E,
    /// Handling for missing output files.
    missing_files: MissingFilePolicy,
}

impl<C: Clock, E: EnvironmentProbe> ReceiptBuilder<C, E> {
    /// Creates a receipt builder.
    #[must_use]
    pub fn new(
        engine: HashEngine,
        clock: C,
        environment: E,
        missing_files: MissingFilePolicy,
    ) -> Self {
        Self {
            engine,
            clock,
            environment,
            missing_files,
        }
    }

    /// Returns the missing-file policy applied to outputs.
    #[must_use]
    pub const fn missing_files(&self) -> MissingFilePolicy {
        self.missing_files
    }

    /// Builds a receipt for one run.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::MissingInputFile`] or
    /// [`BundleError::HashComputationFailure`] when outputs cannot be hashed,
    /// and [`BundleError::SerializationFailure`] when a gate detail or metric
    /// is not representable as JSON.
    pub fn build<P: AsRef<Path>>(
        &self,
        run_id: RunId,
        inputs: RunInputs,
        gates: Vec<GateResult>,
        metrics: Vec<MetricRecord>,
        output_files: &[P],
    ) -> Result<Receipt, BundleError> {
        ensure_json(&gates)?;
        ensure_json(&metrics)?;
        let outputs_sha256 = self.engine.hash_file_set(output_files).resolve(self.missing_files)?;
        let created_utc = self.clock.now();
        let env = self.environment.fingerprint();
        tracing::debug!(
            run_id = %run_id,
            gates = gates.len(),
            outputs = outputs_sha256.len(),
            "built receipt"
        );
        Ok(Receipt::assemble(run_id, created_utc, inputs, gates, metrics, outputs_sha256, env))
    }
}

/// Fails early on values that cannot be persisted.
fn ensure_json<T: serde::Serialize>(value: &T) -> Result<(), BundleError> {
    serde_json::to_value(value)
        .map(|_| ())
        .map_err(|err| BundleError::SerializationFailure(err.to_string()))
}
