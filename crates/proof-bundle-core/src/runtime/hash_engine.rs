// crates/proof-bundle-core/src/runtime/hash_engine.rs
// ============================================================================
// Module: Proof Bundle Hash Engine
// Description: Content digests for files, text, and declared file sets.
// Purpose: Produce path-keyed digest maps that depend only on file bytes.
// Dependencies: crate::core::hashing, sha2, tracing
// ============================================================================

//! ## Overview
//! The hash engine reads files relative to a bundle root and keys results by
//! the declared path in POSIX form. File-set hashing never raises: missing
//! and unreadable files are reported alongside the digests and the caller
//! decides, through [`MissingFilePolicy`], whether an incomplete set is fatal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::core::DigestMap;
use crate::core::HashDigest;
use crate::core::hashing;
use crate::runtime::error::BundleError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Read buffer size for streaming file digests.
pub const HASH_BUFFER_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Missing File Policy
// ============================================================================

/// Caller decision for declared files that are absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFilePolicy {
    /// Any missing file aborts the run.
    Fail,
    /// Missing files are dropped from the digest map with a warning.
    Omit,
}

// ============================================================================
// SECTION: File Set Digest
// ============================================================================

/// Existing file that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableFile {
    /// POSIX-style declared path.
    pub path: String,
    /// I/O error text.
    pub error: String,
}

/// Result of hashing a declared set of files.
///
/// # Invariants
/// - Every declared path lands in exactly one of `digests`, `missing`, or
///   `unreadable`; duplicates collapse to one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSetDigest {
    /// Digests for readable regular files.
    digests: DigestMap,
    /// Paths that do not exist or are not regular files.
    missing: Vec<String>,
    /// Paths that exist but failed to read.
    unreadable: Vec<UnreadableFile>,
}

impl FileSetDigest {
    /// Returns the digests of files that were hashed.
    #[must_use]
    pub const fn digests(&self) -> &DigestMap {
        &self.digests
    }

    /// Returns declared paths that were not found.
    #[must_use]
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// Returns declared paths that could not be read.
    #[must_use]
    pub fn unreadable(&self) -> &[UnreadableFile] {
        &self.unreadable
    }

    /// Returns true when every declared path was hashed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.unreadable.is_empty()
    }

    /// Applies the caller's missing-file policy and returns the digest map.
    ///
    /// Unreadable files are always fatal.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::HashComputationFailure`] for the first unreadable
    /// file, or [`BundleError::MissingInputFile`] when files are missing under
    /// [`MissingFilePolicy::Fail`].
    pub fn resolve(self, policy: MissingFilePolicy) -> Result<DigestMap, BundleError> {
        if let Some(first) = self.unreadable.into_iter().next() {
            return Err(BundleError::HashComputationFailure {
                path: first.path,
                error: first.error,
            });
        }
        if !self.missing.is_empty() {
            match policy {
                MissingFilePolicy::Fail => {
                    return Err(BundleError::MissingInputFile {
                        paths: self.missing,
                    });
                }
                MissingFilePolicy::Omit => {
                    for path in &self.missing {
                        tracing::warn!(path = %path, "declared file missing; omitted");
                    }
                }
            }
        }
        Ok(self.digests)
    }
}

// ============================================================================
// SECTION: Hash Engine
// ============================================================================

/// Content hasher rooted at a bundle directory.
#[derive(Debug, Clone)]
pub struct HashEngine {
    /// Directory that relative paths resolve against.
    root: PathBuf,
}

impl Default for HashEngine {
    fn default() -> Self {
        Self::new(".")
    }
}

impl HashEngine {
    /// Creates an engine that resolves relative paths against `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Returns the bundle root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Hashes the complete content of a file resolved against the root.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be opened or read.
    pub fn hash_file(&self, path: &Path) -> io::Result<HashDigest> {
        hash_file(&self.root.join(path))
    }

    /// Hashes the UTF-8 encoding of `text`.
    #[must_use]
    pub fn hash_text(text: &str) -> HashDigest {
        hashing::hash_text(text)
    }

    /// Hashes every declared path, recording missing and unreadable files.
    #[must_use]
    pub fn hash_file_set<P: AsRef<Path>>(&self, paths: &[P]) -> FileSetDigest {
        let mut out = FileSetDigest::default();
        for path in paths {
            let path = path.as_ref();
            let key = posix_key(path);
            if out.digests.contains_key(&key)
                || out.missing.contains(&key)
                || out.unreadable.iter().any(|entry| entry.path == key)
            {
                continue;
            }
            let resolved = self.root.join(path);
            match fs::metadata(&resolved) {
                Ok(meta) if meta.is_file() => match hash_file(&resolved) {
                    Ok(digest) => {
                        tracing::debug!(path = %key, digest = %digest, "hashed file");
                        out.digests.insert(key, digest);
                    }
                    Err(err) => out.unreadable.push(UnreadableFile {
                        path: key,
                        error: err.to_string(),
                    }),
                },
                Ok(_) => out.missing.push(key),
                Err(err) if err.kind() == io::ErrorKind::NotFound => out.missing.push(key),
                Err(err) => out.unreadable.push(UnreadableFile {
                    path: key,
                    error: err.to_string(),
                }),
            }
        }
        out
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Streams a file through SHA-256.
///
/// # Errors
///
/// Returns the underlying I/O error when the file cannot be opened or read.
pub fn hash_file(path: &Path) -> io::Result<HashDigest> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0_u8; HASH_BUFFER_BYTES];
    loop {
        let read = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        hasher.update(&buf[..read]);
    }
    Ok(HashDigest::new(&hasher.finalize()))
}

/// Renders a path with `/` separators, dropping `.` components.
#[must_use]
pub fn posix_key(path: &Path) -> String {
    let mut absolute = false;
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => {
                parts.push(prefix.as_os_str().to_string_lossy().into_owned());
            }
            Component::RootDir => absolute = true,
            Component::CurDir => {}
            Component::ParentDir => parts.push("..".to_string()),
            Component::Normal(value) => parts.push(value.to_string_lossy().into_owned()),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Unit tests for file-set resolution.
#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::use_debug,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use super::BundleError;
    use super::DigestMap;
    use super::FileSetDigest;
    use super::MissingFilePolicy;
    use super::UnreadableFile;

    /// Builds a set holding one missing and one unreadable entry.
    fn set_with_unreadable_entry() -> FileSetDigest {
        FileSetDigest {
            digests: DigestMap::new(),
            missing: vec!["gone.txt".to_string()],
            unreadable: vec![UnreadableFile {
                path: "locked.bin".to_string(),
                error: "permission denied".to_string(),
            }],
        }
    }

    /// Unreadable entries win over missing ones under both policies.
    #[test]
    fn unreadable_files_fail_under_every_policy() {
        for policy in [MissingFilePolicy::Omit, MissingFilePolicy::Fail] {
            match set_with_unreadable_entry().resolve(policy) {
                Err(BundleError::HashComputationFailure {
                    path,
                    error,
                }) => {
                    assert_eq!(path, "locked.bin");
                    assert_eq!(error, "permission denied");
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }
}
