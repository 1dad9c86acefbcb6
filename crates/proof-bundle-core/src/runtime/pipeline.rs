// crates/proof-bundle-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Proof Bundle Pipeline
// Description: End-to-end run: gates, receipt, persistence, manifest.
// Purpose: Turn one run submission into a persisted, chained proof bundle.
// Dependencies: crate::{core, interfaces}, crate::runtime::*, serde
// ============================================================================

//! ## Overview
//! The pipeline runs each phase in a fixed order: evaluate gates, build the
//! receipt, persist it, build the manifest over the tracked files plus the
//! receipt, and persist the manifest. The first error aborts the run, so a
//! manifest is never written for a run that failed earlier.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::core::GateResult;
use crate::core::Manifest;
use crate::core::MetricRecord;
use crate::core::PacketDescriptor;
use crate::core::RunId;
use crate::core::RunInputs;
use crate::interfaces::Clock;
use crate::interfaces::EnvironmentProbe;
use crate::runtime::error::BundleError;
use crate::runtime::gate::GateEvaluator;
use crate::runtime::hash_engine::HashEngine;
use crate::runtime::hash_engine::MissingFilePolicy;
use crate::runtime::manifest::ManifestBuilder;
use crate::runtime::receipt::ReceiptBuilder;
use crate::runtime::store::BundleStore;
use crate::runtime::store::PersistedReceipt;
use crate::runtime::store::ensure_relative_path;
use crate::runtime::store::receipt_file_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder in the manifest name replaced by the run identifier.
pub const RUN_ID_PLACEHOLDER: &str = "{run_id}";

// ============================================================================
// SECTION: Submission
// ============================================================================

/// Baseline comparison requested by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateComparison {
    /// Gate name recorded in the receipt.
    pub gate: String,
    /// Policy name (for example `rmse`).
    pub policy: String,
    /// Baseline metric value.
    pub baseline: f64,
    /// Candidate metric value.
    pub candidate: f64,
    /// Required relative improvement; defaults to the pipeline setting.
    #[serde(default)]
    pub min_improvement_frac: Option<f64>,
}

/// Results handed over by the run that produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSubmission {
    /// Run inputs recorded verbatim.
    #[serde(default)]
    pub inputs: RunInputs,
    /// Metric values in caller order.
    #[serde(default)]
    pub metrics: Vec<MetricRecord>,
    /// Baseline comparisons to evaluate.
    #[serde(default)]
    pub comparisons: Vec<GateComparison>,
    /// Gates decided by the caller, recorded before comparisons.
    #[serde(default)]
    pub static_gates: Vec<GateResult>,
    /// Output files hashed into the receipt.
    #[serde(default)]
    pub output_files: Vec<String>,
    /// Additional packet files hashed into the manifest.
    #[serde(default)]
    pub packet_files: Vec<String>,
    /// Explicit run identifier; generated from the clock when absent.
    #[serde(default)]
    pub run_id: Option<RunId>,
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Pipeline settings resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Packet description for the manifest.
    pub packet: PacketDescriptor,
    /// Prefix for generated run identifiers.
    pub run_id_prefix: String,
    /// Improvement fraction used when a comparison omits one.
    pub default_min_improvement_frac: f64,
    /// Handling for missing declared files.
    pub missing_files: MissingFilePolicy,
    /// Root-relative receipt directory.
    pub receipts_dir: PathBuf,
    /// Root-relative manifest file name; may contain `{run_id}`.
    pub manifest_name: String,
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleOutcome {
    /// Persisted receipt.
    pub receipt: PersistedReceipt,
    /// Persisted manifest.
    pub manifest: Manifest,
    /// Full path of the written manifest.
    pub manifest_path: PathBuf,
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Proof bundle pipeline rooted at a bundle directory.
#[derive(Debug)]
pub struct ProofBundlePipeline<C, E> {
    /// Resolved settings.
    settings: PipelineSettings,
    /// Gate policy registry.
    evaluator: GateEvaluator,
    /// Hash engine for receipt outputs and manifest files.
    engine: HashEngine,
    /// Append-only record store.
    store: BundleStore,
    /// Time source.
    clock: C,
    /// Environment fingerprint source.
    environment: E,
}

impl<C: Clock, E: EnvironmentProbe> ProofBundlePipeline<C, E> {
    /// Creates a pipeline rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::InvalidPath`] when the root or configured
    /// output locations are unusable.
    pub fn new(
        root: impl Into<PathBuf>,
        settings: PipelineSettings,
        evaluator: GateEvaluator,
        clock: C,
        environment: E,
    ) -> Result<Self, BundleError> {
        let root = root.into();
        ensure_relative_dir(&settings.receipts_dir)?;
        ensure_relative_path(Path::new(&settings.manifest_name))?;
        let store = BundleStore::new(root.clone())?;
        Ok(Self {
            settings,
            evaluator,
            engine: HashEngine::new(root),
            store,
            clock,
            environment,
        })
    }

    /// Returns the resolved settings.
    #[must_use]
    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs one submission end to end.
    ///
    /// # Errors
    ///
    /// Returns the first [`BundleError`] raised by any phase.
    pub fn run(&self, submission: RunSubmission) -> Result<BundleOutcome, BundleError> {
        let run_id = match submission.run_id {
            Some(run_id) => run_id,
            None => RunId::generate(&self.settings.run_id_prefix, self.clock.now())?,
        };
        let span = tracing::info_span!("proof_bundle.run", run_id = %run_id);
        let _entered = span.enter();

        for path in submission.output_files.iter().chain(&submission.packet_files) {
            ensure_relative_path(Path::new(path))?;
        }

        tracing::info!(
            comparisons = submission.comparisons.len(),
            static_gates = submission.static_gates.len(),
            "evaluating gates"
        );
        let mut gates = submission.static_gates;
        for comparison in &submission.comparisons {
            let fraction = comparison
                .min_improvement_frac
                .unwrap_or(self.settings.default_min_improvement_frac);
            gates.push(self.evaluator.gate(
                &comparison.gate,
                &comparison.policy,
                comparison.baseline,
                comparison.candidate,
                fraction,
            )?);
        }

        tracing::info!(outputs = submission.output_files.len(), "building receipt");
        let receipt_builder = ReceiptBuilder::new(
            self.engine.clone(),
            &self.clock,
            &self.environment,
            self.settings.missing_files,
        );
        let receipt = receipt_builder.build(
            run_id.clone(),
            submission.inputs,
            gates,
            submission.metrics,
            submission.output_files.as_slice(),
        )?;
        let receipt_path = self.settings.receipts_dir.join(receipt_file_name(&run_id));
        let persisted = self.store.persist_receipt(receipt, &receipt_path)?;

        tracing::info!(packet_files = submission.packet_files.len(), "building manifest");
        let mut tracked = submission.packet_files;
        tracked.extend(submission.output_files);
        let manifest_builder =
            ManifestBuilder::new(self.engine.clone(), &self.clock, self.settings.missing_files);
        let manifest =
            manifest_builder.build(&self.settings.packet, &persisted, tracked.as_slice())?;
        let manifest_name =
            self.settings.manifest_name.replace(RUN_ID_PLACEHOLDER, run_id.as_str());
        let manifest_path = self.store.persist_manifest(&manifest, Path::new(&manifest_name))?;

        Ok(BundleOutcome {
            receipt: persisted,
            manifest,
            manifest_path,
        })
    }
}

/// Rejects absolute or escaping directory paths; an empty path is the root.
fn ensure_relative_dir(dir: &Path) -> Result<(), BundleError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    ensure_relative_path(dir)
}
