// crates/proof-bundle-core/src/core/hashing.rs
// ============================================================================
// Module: Proof Bundle Canonical Hashing
// Description: SHA-256 digests and RFC 8785 JSON canonicalization.
// Purpose: Provide deterministic content digests for receipts and manifests.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Every digest in a proof bundle is a lowercase hex SHA-256 value without a
//! prefix. Structured reports are rendered as RFC 8785 (JCS) bytes so that
//! logically identical maps serialize identically regardless of insertion
//! order or platform.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Hash Algorithm
// ============================================================================

/// Supported hash algorithms for proof bundle artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 hashing.
    Sha256,
}

impl HashAlgorithm {
    /// Returns the stable label for the algorithm.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    /// Returns the hex length of digests produced by the algorithm.
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
        }
    }
}

/// Default hash algorithm for proof bundles.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Lowercase hex content digest.
///
/// # Invariants
/// - Always `DEFAULT_HASH_ALGORITHM.hex_len()` characters of `[0-9a-f]`.
/// - Serializes as a bare string so persisted maps read `path -> hex`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HashDigest(String);

impl HashDigest {
    /// Creates a digest from raw digest bytes.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self(hex_encode(bytes))
    }

    /// Parses a hex digest string, rejecting uppercase and malformed input.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidDigest`] when the value is not a lowercase
    /// SHA-256 hex string.
    pub fn parse(value: &str) -> Result<Self, HashError> {
        let valid = value.len() == DEFAULT_HASH_ALGORITHM.hex_len()
            && value.bytes().all(|byte| matches!(byte, b'0'..=b'9' | b'a'..=b'f'));
        if !valid {
            return Err(HashError::InvalidDigest(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    /// Returns the hex digest as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for HashDigest {
    type Error = HashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HashDigest> for String {
    fn from(value: HashDigest) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing or parsing digests.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
    /// Digest string is malformed.
    #[error("invalid sha256 hex digest: '{0}'")]
    InvalidDigest(String),
}

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}


/// Hashes raw bytes using the provided algorithm.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> HashDigest {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            HashDigest::new(&hasher.finalize())
        }
    }
}

/// Hashes the UTF-8 encoding of `text`.
#[must_use]
pub fn hash_text(text: &str) -> HashDigest {
    hash_bytes(DEFAULT_HASH_ALGORITHM, text.as_bytes())
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
