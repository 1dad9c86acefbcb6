// crates/proof-bundle-core/src/core/time.rs
// ============================================================================
// Module: Proof Bundle Time Model
// Description: UTC timestamps with a fixed ISO-8601 text form.
// Purpose: Keep receipt and manifest timestamps byte-stable across round trips.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Timestamps are UTC instants rendered as
//! `YYYY-MM-DDTHH:MM:SS.ffffff+00:00`. The core never reads wall-clock time
//! directly; callers supply instants through a [`Clock`](crate::Clock).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Canonical timestamp layout with explicit UTC offset.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6][offset_hour \
     sign:mandatory]:[offset_minute]"
);

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical UTC timestamp used in receipts and manifests.
///
/// # Invariants
/// - The wrapped instant is always at UTC offset zero.
/// - Sub-microsecond precision is truncated so text round trips are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Wraps an instant, normalizing it to UTC at microsecond precision.
    #[must_use]
    pub fn from_datetime(value: OffsetDateTime) -> Self {
        let utc = value.to_offset(UtcOffset::UTC);
        let micros = utc.microsecond();
        let truncated = utc.replace_microsecond(micros).unwrap_or(utc);
        Self(truncated)
    }

    /// Builds a timestamp from unix seconds.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::OutOfRange`] when the value is not representable.
    pub fn from_unix_seconds(seconds: i64) -> Result<Self, TimestampError> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .map(Self::from_datetime)
            .map_err(|err| TimestampError::OutOfRange(err.to_string()))
    }

    /// Parses the canonical form, falling back to any RFC 3339 timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::Parse`] when neither format matches.
    pub fn parse(value: &str) -> Result<Self, TimestampError> {
        OffsetDateTime::parse(value, TIMESTAMP_FORMAT)
            .or_else(|_| OffsetDateTime::parse(value, &Rfc3339))
            .map(Self::from_datetime)
            .map_err(|err| TimestampError::Parse(format!("'{value}': {err}")))
    }

    /// Returns the wrapped UTC instant.
    #[must_use]
    pub const fn as_datetime(&self) -> OffsetDateTime {
        self.0
    }

    /// Renders the canonical text form.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::Format`] when the instant cannot be rendered.
    pub fn to_canonical_string(&self) -> Result<String, TimestampError> {
        self.0.format(TIMESTAMP_FORMAT).map_err(|err| TimestampError::Format(err.to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_canonical_string().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = self.to_canonical_string().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Timestamp parsing and formatting errors.
#[derive(Debug, Error)]
pub enum TimestampError {
    /// Timestamp text did not parse.
    #[error("invalid timestamp {0}")]
    Parse(String),
    /// Timestamp could not be rendered.
    #[error("failed to format timestamp: {0}")]
    Format(String),
    /// Value is outside the representable range.
    #[error("timestamp out of range: {0}")]
    OutOfRange(String),
}
