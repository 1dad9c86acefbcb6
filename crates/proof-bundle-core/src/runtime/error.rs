// crates/proof-bundle-core/src/runtime/error.rs
// ============================================================================
// Module: Proof Bundle Runtime Errors
// Description: Failure kinds for hashing, assembly, and persistence.
// Purpose: Give every run-aborting condition a distinct, reportable variant.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! There is no retry anywhere in the bundle runtime. Every variant here aborts
//! the run, and the pipeline never writes a manifest after one is raised.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::HashError;
use crate::core::RunIdError;
use crate::core::TimestampError;
use crate::runtime::gate::GateError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building, persisting, or loading proof bundle artifacts.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Declared files are absent or not regular files.
    #[error("missing input files: {}", .paths.join(", "))]
    MissingInputFile {
        /// POSIX-style paths that were not found.
        paths: Vec<String>,
    },
    /// An existing file could not be read for hashing.
    #[error("failed to hash {path}: {error}")]
    HashComputationFailure {
        /// POSIX-style path of the unreadable file.
        path: String,
        /// Underlying I/O error text.
        error: String,
    },
    /// A record could not be serialized.
    #[error("serialization failed: {0}")]
    SerializationFailure(String),
    /// An artifact could not be written.
    #[error("failed to write {path}: {error}")]
    WriteFailure {
        /// Target path.
        path: String,
        /// Underlying error text.
        error: String,
    },
    /// A persisted artifact could not be read.
    #[error("failed to read {path}: {error}")]
    ReadFailure {
        /// Source path.
        path: String,
        /// Underlying error text.
        error: String,
    },
    /// A persisted artifact did not match its schema.
    #[error("invalid document {path}: {error}")]
    InvalidDocument {
        /// Source path.
        path: String,
        /// Parse error text.
        error: String,
    },
    /// A path escapes the bundle root or is otherwise unusable.
    #[error("invalid artifact path {path}: {reason}")]
    InvalidPath {
        /// Offending path.
        path: String,
        /// Rejection reason.
        reason: &'static str,
    },
    /// A loaded receipt belongs to a different run.
    #[error("run id mismatch: expected {expected}, found {found}")]
    RunMismatch {
        /// Run identifier the caller expected.
        expected: String,
        /// Run identifier recorded in the document.
        found: String,
    },
    /// Gate evaluation failed.
    #[error(transparent)]
    Gate(#[from] GateError),
    /// Run identifier generation or parsing failed.
    #[error(transparent)]
    RunId(#[from] RunIdError),
    /// Timestamp rendering failed.
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

impl From<HashError> for BundleError {
    fn from(err: HashError) -> Self {
        Self::SerializationFailure(err.to_string())
    }
}
