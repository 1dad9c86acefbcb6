// crates/proof-bundle-core/src/runtime/mod.rs
// ============================================================================
// Module: Proof Bundle Runtime
// Description: Hashing, gate evaluation, builders, persistence, and verification.
// Purpose: Produce and audit proof bundles from run results.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules turn run results into a receipt and manifest on disk and
//! re-verify existing bundles. All entry points share the same hash engine so
//! producers and auditors agree on every digest.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod error;
pub mod gate;
pub mod hash_engine;
pub mod manifest;
pub mod pipeline;
pub mod receipt;
pub mod store;
pub mod verify;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::BundleError;
pub use gate::GateError;
pub use gate::GateEvaluator;
pub use hash_engine::FileSetDigest;
pub use hash_engine::HashEngine;
pub use hash_engine::MissingFilePolicy;
pub use hash_engine::UnreadableFile;
pub use manifest::ManifestBuilder;
pub use pipeline::BundleOutcome;
pub use pipeline::GateComparison;
pub use pipeline::PipelineSettings;
pub use pipeline::ProofBundlePipeline;
pub use pipeline::RunSubmission;
pub use receipt::ReceiptBuilder;
pub use store::BundleStore;
pub use store::PersistedReceipt;
pub use store::canonical_pretty_json;
pub use store::load_manifest;
pub use store::load_receipt;
pub use store::load_run_receipt;
pub use verify::ManifestVerifier;
pub use verify::VerificationReport;
pub use verify::VerificationStatus;
