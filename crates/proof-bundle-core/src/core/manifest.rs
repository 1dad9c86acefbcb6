// crates/proof-bundle-core/src/core/manifest.rs
// ============================================================================
// Module: Proof Bundle Manifest
// Description: Package-level manifest schema and digest rule.
// Purpose: Attest to the content of every tracked file, receipt included.
// Dependencies: crate::core::{hashing, identifiers, receipt, time}, serde
// ============================================================================

//! ## Overview
//! The manifest digest is a checksum of checksums: SHA-256 over the
//! `path -> digest` map rendered as key-sorted JSON with `", "` and `": "`
//! separators and ASCII-only string escapes. Auditors recompute it with any
//! JSON encoder that sorts keys, so the rendering is fixed byte for byte.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashDigest;
use crate::core::hashing::hash_text;
use crate::core::identifiers::RunId;
use crate::core::receipt::DigestMap;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Manifest schema version tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ManifestSchema {
    /// Version 1 manifest layout.
    #[default]
    #[serde(rename = "proof-bundle.manifest/v1")]
    V1,
}

// ============================================================================
// SECTION: Packet Metadata
// ============================================================================

/// Caller-supplied packet description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketDescriptor {
    /// Project identifier.
    pub project_id: String,
    /// Packet type label (for example `PUBLIC`).
    pub packet_type: String,
    /// Packet version label.
    pub version: String,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
}

/// Packet metadata embedded in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacketInfo {
    /// Project identifier.
    pub project_id: String,
    /// Packet type label.
    #[serde(rename = "type")]
    pub packet_type: String,
    /// Packet version label.
    pub version: String,
    /// Manifest generation time.
    pub generated_utc: Timestamp,
    /// Free-text notes.
    pub notes: String,
}

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// Package-level manifest for a proof bundle.
///
/// # Invariants
/// - `manifest_sha256 == compute_manifest_digest(files_sha256)` when built.
/// - `files_sha256` always contains the run receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Schema version tag.
    schema_version: ManifestSchema,
    /// Packet metadata.
    packet: PacketInfo,
    /// Run identifier.
    run_id: RunId,
    /// Tracked file digests.
    files_sha256: DigestMap,
    /// Digest over the canonical `files_sha256` encoding.
    manifest_sha256: HashDigest,
}

impl Manifest {
    /// Assembles a manifest, computing the top-level digest.
    pub(crate) fn assemble(packet: PacketInfo, run_id: RunId, files_sha256: DigestMap) -> Self {
        let manifest_sha256 = compute_manifest_digest(&files_sha256);
        Self {
            schema_version: ManifestSchema::V1,
            packet,
            run_id,
            files_sha256,
            manifest_sha256,
        }
    }

    /// Returns the schema version tag.
    #[must_use]
    pub const fn schema_version(&self) -> ManifestSchema {
        self.schema_version
    }

    /// Returns the packet metadata.
    #[must_use]
    pub const fn packet(&self) -> &PacketInfo {
        &self.packet
    }

    /// Returns the run identifier.
    #[must_use]
    pub const fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Returns the tracked file digests.
    #[must_use]
    pub const fn files_sha256(&self) -> &DigestMap {
        &self.files_sha256
    }

    /// Returns the recorded manifest digest.
    #[must_use]
    pub const fn manifest_sha256(&self) -> &HashDigest {
        &self.manifest_sha256
    }
}

// ============================================================================
// SECTION: Digest Rule
// ============================================================================

/// Computes the manifest digest over a `path -> digest` map.
#[must_use]
pub fn compute_manifest_digest(files: &DigestMap) -> HashDigest {
    hash_text(&manifest_digest_text(files))
}

/// Renders the text the manifest digest is taken over.
///
/// Keys come out in code point order (the map is sorted), entries are joined
/// by `", "`, and each key is separated from its value by `": "`.
#[must_use]
pub fn manifest_digest_text(files: &DigestMap) -> String {
    let mut text = String::from("{");
    for (index, (path, digest)) in files.iter().enumerate() {
        if index > 0 {
            text.push_str(", ");
        }
        push_json_string(&mut text, path);
        text.push_str(": ");
        push_json_string(&mut text, digest.as_str());
    }
    text.push('}');
    text
}

/// Appends `value` as a JSON string, escaping everything outside printable ASCII.
fn push_json_string(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            ' '..='~' => out.push(ch),
            _ => {
                let mut units = [0_u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    push_unicode_escape(out, *unit);
                }
            }
        }
    }
    out.push('"');
}

/// Appends a `\uXXXX` escape with lowercase hex digits.
fn push_unicode_escape(out: &mut String, unit: u16) {
    out.push_str("\\u");
    for shift in [12_u16, 8, 4, 0] {
        let nibble = u32::from((unit >> shift) & 0xf);
        out.push(char::from_digit(nibble, 16).unwrap_or('0'));
    }
}
