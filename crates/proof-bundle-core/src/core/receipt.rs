// crates/proof-bundle-core/src/core/receipt.rs
// ============================================================================
// Module: Proof Bundle Receipt
// Description: Per-run audit record schema.
// Purpose: Record inputs, gates, metrics, output digests, and environment.
// Dependencies: crate::core::{gate, hashing, identifiers, time}, serde
// ============================================================================

//! ## Overview
//! A receipt is the single source of truth for what happened in one run. It
//! is created once, after all metrics and gates are known, and is never
//! edited afterwards. `created_utc` and `env` are the only fields that are not
//! a pure function of the builder arguments.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::gate::GateResult;
use crate::core::gate::MetricRecord;
use crate::core::hashing::HashDigest;
use crate::core::identifiers::RunId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Receipt schema version tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReceiptSchema {
    /// Version 1 receipt layout.
    #[default]
    #[serde(rename = "proof-bundle.receipt/v1")]
    V1,
}

/// Free-form run inputs recorded verbatim.
pub type RunInputs = Map<String, Value>;

/// Mapping of POSIX-style relative path to content digest.
pub type DigestMap = BTreeMap<String, HashDigest>;

// ============================================================================
// SECTION: Environment
// ============================================================================

/// Descriptive fingerprint of the environment that produced a receipt.
///
/// # Invariants
/// - Informational only; never used for verification decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentFingerprint {
    /// Producer runtime and version.
    pub runtime_version: String,
    /// Operating system and architecture description.
    pub platform: String,
    /// Path of the producing executable.
    pub executable: String,
    /// Working directory at build time.
    pub cwd: String,
}

// ============================================================================
// SECTION: Receipt
// ============================================================================

/// Per-run audit record.
///
/// # Invariants
/// - Immutable once constructed; fields are only readable.
/// - `outputs_sha256` keys are POSIX-style paths relative to the bundle root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Receipt {
    /// Schema version tag.
    schema_version: ReceiptSchema,
    /// Run identifier.
    run_id: RunId,
    /// Creation time.
    created_utc: Timestamp,
    /// Run inputs, passed through verbatim.
    inputs: RunInputs,
    /// Gate outcomes in evaluation order.
    gates: Vec<GateResult>,
    /// Metric values in caller order.
    metrics: Vec<MetricRecord>,
    /// Output file digests.
    outputs_sha256: DigestMap,
    /// Environment fingerprint.
    env: EnvironmentFingerprint,
}

impl Receipt {
    /// Assembles a receipt from fully computed parts.
    #[must_use]
    pub(crate) fn assemble(
        run_id: RunId,
        created_utc: Timestamp,
        inputs: RunInputs,
        gates: Vec<GateResult>,
        metrics: Vec<MetricRecord>,
        outputs_sha256: DigestMap,
        env: EnvironmentFingerprint,
    ) -> Self {
        Self {
            schema_version: ReceiptSchema::V1,
            run_id,
            created_utc,
            inputs,
            gates,
            metrics,
            outputs_sha256,
            env,
        }
    }

    /// Returns the schema version tag.
    #[must_use]
    pub const fn schema_version(&self) -> ReceiptSchema {
        self.schema_version
    }

    /// Returns the run identifier.
    #[must_use]
    pub const fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Returns the creation time.
    #[must_use]
    pub const fn created_utc(&self) -> Timestamp {
        self.created_utc
    }

    /// Returns the recorded inputs.
    #[must_use]
    pub const fn inputs(&self) -> &RunInputs {
        &self.inputs
    }

    /// Returns the gate outcomes.
    #[must_use]
    pub fn gates(&self) -> &[GateResult] {
        &self.gates
    }

    /// Returns the metric records.
    #[must_use]
    pub fn metrics(&self) -> &[MetricRecord] {
        &self.metrics
    }

    /// Returns the output digests.
    #[must_use]
    pub const fn outputs_sha256(&self) -> &DigestMap {
        &self.outputs_sha256
    }

    /// Returns the environment fingerprint.
    #[must_use]
    pub const fn env(&self) -> &EnvironmentFingerprint {
        &self.env
    }

    /// Returns true when every recorded gate passed.
    #[must_use]
    pub fn all_gates_passed(&self) -> bool {
        self.gates.iter().all(GateResult::passed)
    }
}
