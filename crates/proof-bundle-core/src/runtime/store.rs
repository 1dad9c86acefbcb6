// crates/proof-bundle-core/src/runtime/store.rs
// ============================================================================
// Module: Proof Bundle Artifact Store
// Description: Append-only persistence and bounded loading of bundle records.
// Purpose: Write receipts and manifests as canonical pretty JSON under a root.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Receipts and manifests are written once. The store resolves every target
//! path relative to its root, refuses absolute or escaping paths, and opens
//! files with create-new semantics so an existing record is never replaced.
//! Output bytes are pretty JSON with sorted keys, two-space indentation, and
//! a single trailing newline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Read;
use std::io::Write;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::Manifest;
use crate::core::Receipt;
use crate::core::RunId;
use crate::runtime::error::BundleError;
use crate::runtime::hash_engine::posix_key;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum size of a persisted receipt or manifest.
pub const MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Serialization
// ============================================================================

/// Serializes a record as sorted-key, two-space-indented JSON plus newline.
///
/// # Errors
///
/// Returns [`BundleError::SerializationFailure`] when the value cannot be
/// represented as JSON (for example a non-finite float).
pub fn canonical_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, BundleError> {
    let value = serde_json::to_value(value)
        .map_err(|err| BundleError::SerializationFailure(err.to_string()))?;
    let mut bytes = serde_json::to_vec_pretty(&value)
        .map_err(|err| BundleError::SerializationFailure(err.to_string()))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Returns the receipt file name for a run.
#[must_use]
pub fn receipt_file_name(run_id: &RunId) -> String {
    format!("receipt_{run_id}.json")
}

// ============================================================================
// SECTION: Persisted Receipt
// ============================================================================

/// Receipt known to exist on disk at a root-relative path.
///
/// # Invariants
/// - Only produced by [`BundleStore`] after a successful write or read.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedReceipt {
    /// Receipt content.
    receipt: Receipt,
    /// POSIX-style path relative to the store root.
    path: String,
}

impl PersistedReceipt {
    /// Returns the receipt.
    #[must_use]
    pub const fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    /// Returns the root-relative receipt path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the run identifier recorded in the receipt.
    #[must_use]
    pub const fn run_id(&self) -> &RunId {
        self.receipt.run_id()
    }

    /// Consumes the wrapper and returns the receipt.
    #[must_use]
    pub fn into_receipt(self) -> Receipt {
        self.receipt
    }
}

// ============================================================================
// SECTION: Bundle Store
// ============================================================================

/// Append-only file store rooted at the bundle directory.
#[derive(Debug, Clone)]
pub struct BundleStore {
    /// Root directory for all records.
    root: PathBuf,
}

impl BundleStore {
    /// Creates a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::InvalidPath`] when the root exceeds length limits.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, BundleError> {
        let root = root.into();
        validate_path(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the store root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a receipt and returns it wrapped with its relative path.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError`] when serialization fails, the path is invalid,
    /// or the file already exists.
    pub fn persist_receipt(
        &self,
        receipt: Receipt,
        relative: &Path,
    ) -> Result<PersistedReceipt, BundleError> {
        let bytes = canonical_pretty_json(&receipt)?;
        self.write_new(relative, &bytes)?;
        tracing::info!(run_id = %receipt.run_id(), path = %relative.display(), "receipt written");
        Ok(PersistedReceipt {
            receipt,
            path: posix_key(relative),
        })
    }

    /// Writes a manifest and returns its full path.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError`] when serialization fails, the path is invalid,
    /// or the file already exists.
    pub fn persist_manifest(
        &self,
        manifest: &Manifest,
        relative: &Path,
    ) -> Result<PathBuf, BundleError> {
        let bytes = canonical_pretty_json(manifest)?;
        let path = self.write_new(relative, &bytes)?;
        tracing::info!(
            run_id = %manifest.run_id(),
            manifest_sha256 = %manifest.manifest_sha256(),
            path = %relative.display(),
            "manifest written"
        );
        Ok(path)
    }

    /// Loads a receipt that was previously persisted under this root.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError`] when the path is invalid or the document cannot
    /// be read or parsed.
    pub fn open_receipt(&self, relative: &Path) -> Result<PersistedReceipt, BundleError> {
        ensure_relative_path(relative)?;
        let receipt = load_receipt(&self.root.join(relative))?;
        Ok(PersistedReceipt {
            receipt,
            path: posix_key(relative),
        })
    }

    /// Writes bytes to a new file below the root.
    fn write_new(&self, relative: &Path, bytes: &[u8]) -> Result<PathBuf, BundleError> {
        ensure_relative_path(relative)?;
        let joined = self.root.join(relative);
        validate_path(&joined)?;
        if let Some(parent) = joined.parent() {
            fs::create_dir_all(parent).map_err(|err| write_failure(&joined, &err))?;
        }
        let path = resolve_path(&self.root, relative)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|err| write_failure(&path, &err))?;
        file.write_all(bytes).map_err(|err| write_failure(&path, &err))?;
        file.sync_all().map_err(|err| write_failure(&path, &err))?;
        Ok(path)
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads a receipt from disk.
///
/// # Errors
///
/// Returns [`BundleError::ReadFailure`] or [`BundleError::InvalidDocument`].
pub fn load_receipt(path: &Path) -> Result<Receipt, BundleError> {
    load_document(path)
}

/// Loads a receipt and checks that it belongs to the expected run.
///
/// # Errors
///
/// Returns [`BundleError::RunMismatch`] when the recorded run differs, in
/// addition to the errors of [`load_receipt`].
pub fn load_run_receipt(path: &Path, expected: &RunId) -> Result<Receipt, BundleError> {
    let receipt = load_receipt(path)?;
    if receipt.run_id() != expected {
        return Err(BundleError::RunMismatch {
            expected: expected.to_string(),
            found: receipt.run_id().to_string(),
        });
    }
    Ok(receipt)
}

/// Loads a manifest from disk.
///
/// # Errors
///
/// Returns [`BundleError::ReadFailure`] or [`BundleError::InvalidDocument`].
pub fn load_manifest(path: &Path) -> Result<Manifest, BundleError> {
    load_document(path)
}

/// Reads and parses a bounded JSON document.
fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, BundleError> {
    let bytes = read_bytes_with_limit(path, MAX_DOCUMENT_BYTES)?;
    serde_json::from_slice(&bytes).map_err(|err| BundleError::InvalidDocument {
        path: path.display().to_string(),
        error: err.to_string(),
    })
}

/// Reads a file, failing when it exceeds `max_bytes`.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, BundleError> {
    let file = File::open(path).map_err(|err| read_failure(path, &err.to_string()))?;
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(|err| read_failure(path, &err.to_string()))?;
    if bytes.len() > max_bytes {
        return Err(read_failure(path, &format!("document exceeds {max_bytes} bytes")));
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Path Validation
// ============================================================================

/// Rejects absolute paths and parent-directory components.
///
/// # Errors
///
/// Returns [`BundleError::InvalidPath`] for absolute or escaping paths.
pub fn ensure_relative_path(candidate: &Path) -> Result<(), BundleError> {
    if candidate.is_absolute() {
        return Err(invalid_path(candidate, "absolute path not allowed"));
    }
    for component in candidate.components() {
        match component {
            Component::ParentDir => {
                return Err(invalid_path(candidate, "path escapes bundle root"));
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(invalid_path(candidate, "absolute path not allowed"));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    if candidate.file_name().is_none() {
        return Err(invalid_path(candidate, "path missing filename"));
    }
    Ok(())
}

/// Resolves a relative path under the canonical root.
fn resolve_path(root: &Path, relative: &Path) -> Result<PathBuf, BundleError> {
    let root = root
        .canonicalize()
        .map_err(|err| write_failure(root, &err))?;
    let joined = root.join(relative);
    let parent = joined
        .parent()
        .ok_or_else(|| invalid_path(relative, "path missing parent"))?;
    let parent = parent.canonicalize().map_err(|err| write_failure(parent, &err))?;
    if !parent.starts_with(&root) {
        return Err(invalid_path(relative, "path escapes bundle root"));
    }
    let file_name = relative
        .file_name()
        .ok_or_else(|| invalid_path(relative, "path missing filename"))?;
    Ok(parent.join(file_name))
}

/// Validates a path against length constraints.
fn validate_path(path: &Path) -> Result<(), BundleError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(invalid_path(path, "path exceeds length limit"));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(invalid_path(path, "path component too long"));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Error Helpers
// ============================================================================

/// Builds an invalid-path error.
fn invalid_path(path: &Path, reason: &'static str) -> BundleError {
    BundleError::InvalidPath {
        path: path.display().to_string(),
        reason,
    }
}

/// Builds a write-failure error.
fn write_failure(path: &Path, err: &std::io::Error) -> BundleError {
    BundleError::WriteFailure {
        path: path.display().to_string(),
        error: err.to_string(),
    }
}

/// Builds a read-failure error.
fn read_failure(path: &Path, error: &str) -> BundleError {
    BundleError::ReadFailure {
        path: path.display().to_string(),
        error: error.to_string(),
    }
}
