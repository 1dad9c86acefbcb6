// crates/proof-bundle-core/src/lib.rs
// ============================================================================
// Module: Proof Bundle Core Library
// Description: Public API surface for proof bundle production and audit.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Proof bundle core records what a run did as a receipt, chains that receipt
//! and the packet files into a manifest with a single digest, and re-verifies
//! bundles offline. Digests depend only on file bytes, so a bundle can be
//! audited on any machine.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::Clock;
pub use interfaces::EnvironmentProbe;
pub use interfaces::FixedClock;
pub use interfaces::HostEnvironment;
pub use interfaces::StaticEnvironment;
pub use interfaces::SystemClock;
pub use runtime::BundleError;
pub use runtime::BundleOutcome;
pub use runtime::BundleStore;
pub use runtime::FileSetDigest;
pub use runtime::GateComparison;
pub use runtime::GateError;
pub use runtime::GateEvaluator;
pub use runtime::HashEngine;
pub use runtime::ManifestBuilder;
pub use runtime::ManifestVerifier;
pub use runtime::MissingFilePolicy;
pub use runtime::PersistedReceipt;
pub use runtime::PipelineSettings;
pub use runtime::ProofBundlePipeline;
pub use runtime::ReceiptBuilder;
pub use runtime::RunSubmission;
pub use runtime::VerificationReport;
pub use runtime::VerificationStatus;
pub use runtime::canonical_pretty_json;
pub use runtime::load_manifest;
pub use runtime::load_receipt;
pub use runtime::load_run_receipt;
