// crates/proof-bundle-core/src/core/identifiers.rs
// ============================================================================
// Module: Proof Bundle Identifiers
// Description: Run identifiers with a fixed, sortable string form.
// Purpose: Provide strongly typed, validated run IDs for receipts and manifests.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! A run identifier has the form `<prefix>_<YYYYMMDD>_<HHMMSS>` in UTC, for
//! example `RUN_20240101_120000`. For a fixed prefix, identifiers generated at
//! later seconds sort lexicographically after earlier ones.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default run identifier prefix.
pub const DEFAULT_RUN_ID_PREFIX: &str = "RUN";
/// Maximum prefix length accepted for run identifiers.
pub const MAX_RUN_ID_PREFIX_LENGTH: usize = 64;
/// Stamp layout appended to the prefix.
const RUN_STAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");
/// Length of the `YYYYMMDD_HHMMSS` stamp.
const RUN_STAMP_LENGTH: usize = 15;

// ============================================================================
// SECTION: Run Identifier
// ============================================================================

/// Run identifier for a single evaluation run.
///
/// # Invariants
/// - Matches `^[A-Za-z0-9_-]+_[0-9]{8}_[0-9]{6}$` with a valid calendar stamp.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RunId(String);

impl RunId {
    /// Generates a run identifier for `prefix` at the given UTC instant.
    ///
    /// # Errors
    ///
    /// Returns [`RunIdError`] when the prefix is invalid or the instant cannot
    /// be formatted.
    pub fn generate(prefix: &str, at: Timestamp) -> Result<Self, RunIdError> {
        validate_prefix(prefix)?;
        let stamp = at
            .as_datetime()
            .format(RUN_STAMP_FORMAT)
            .map_err(|err| RunIdError::Stamp(err.to_string()))?;
        Ok(Self(format!("{prefix}_{stamp}")))
    }

    /// Parses and validates a run identifier string.
    ///
    /// # Errors
    ///
    /// Returns [`RunIdError`] when the value does not match the run id format.
    pub fn parse(value: &str) -> Result<Self, RunIdError> {
        let split = value
            .len()
            .checked_sub(RUN_STAMP_LENGTH + 1)
            .filter(|idx| value.is_char_boundary(*idx))
            .ok_or_else(|| RunIdError::Format(value.to_string()))?;
        let (head, tail) = value.split_at(split);
        let Some(stamp) = tail.strip_prefix('_') else {
            return Err(RunIdError::Format(value.to_string()));
        };
        validate_prefix(head)?;
        let digits_ok = stamp.bytes().enumerate().all(|(idx, byte)| {
            if idx == 8 { byte == b'_' } else { byte.is_ascii_digit() }
        });
        if !digits_ok {
            return Err(RunIdError::Format(value.to_string()));
        }
        PrimitiveDateTime::parse(stamp, RUN_STAMP_FORMAT)
            .map_err(|err| RunIdError::Stamp(err.to_string()))?;
        Ok(Self(value.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the prefix portion of the identifier.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.0[..self.0.len() - RUN_STAMP_LENGTH - 1]
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for RunId {
    type Error = RunIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RunId> for String {
    fn from(value: RunId) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Run identifier validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunIdError {
    /// Prefix is empty, too long, or contains unsupported characters.
    #[error("invalid run id prefix '{0}': expected 1-64 of [A-Za-z0-9_-]")]
    Prefix(String),
    /// Identifier does not match `<prefix>_<YYYYMMDD>_<HHMMSS>`.
    #[error("invalid run id '{0}': expected <prefix>_<YYYYMMDD>_<HHMMSS>")]
    Format(String),
    /// Stamp is not a valid calendar date and time.
    #[error("invalid run id timestamp: {0}")]
    Stamp(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a run identifier prefix.
///
/// # Errors
///
/// Returns [`RunIdError::Prefix`] when the prefix is not accepted.
pub fn validate_prefix(prefix: &str) -> Result<(), RunIdError> {
    let valid = !prefix.is_empty()
        && prefix.len() <= MAX_RUN_ID_PREFIX_LENGTH
        && prefix.bytes().all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-'));
    if valid { Ok(()) } else { Err(RunIdError::Prefix(prefix.to_string())) }
}
