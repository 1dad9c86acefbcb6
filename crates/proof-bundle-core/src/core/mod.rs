// crates/proof-bundle-core/src/core/mod.rs
// ============================================================================
// Module: Proof Bundle Core Types
// Description: Canonical receipt, manifest, gate, and identifier types.
// Purpose: Provide stable, serializable types for proof bundle artifacts.
// Dependencies: serde, serde_json, sha2, time
// ============================================================================

//! ## Overview
//! Core types define the persisted receipt and manifest schemas together with
//! the digest, identifier, and timestamp primitives they are built from.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod gate;
pub mod hashing;
pub mod identifiers;
pub mod manifest;
pub mod policy;
pub mod receipt;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use gate::GateDetails;
pub use gate::GateResult;
pub use gate::GateStatus;
pub use gate::MetricRecord;
pub use gate::ScalarValue;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::DEFAULT_RUN_ID_PREFIX;
pub use identifiers::RunId;
pub use identifiers::RunIdError;
pub use manifest::Manifest;
pub use manifest::ManifestSchema;
pub use manifest::PacketDescriptor;
pub use manifest::PacketInfo;
pub use manifest::compute_manifest_digest;
pub use manifest::manifest_digest_text;
pub use policy::GatePolicy;
pub use policy::MetricDirection;
pub use policy::UnknownPolicyMode;
pub use receipt::DigestMap;
pub use receipt::EnvironmentFingerprint;
pub use receipt::Receipt;
pub use receipt::ReceiptSchema;
pub use receipt::RunInputs;
pub use time::Timestamp;
pub use time::TimestampError;
