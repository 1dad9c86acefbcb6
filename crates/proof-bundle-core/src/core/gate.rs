// crates/proof-bundle-core/src/core/gate.rs
// ============================================================================
// Module: Proof Bundle Gate Records
// Description: Gate outcomes, scalar values, and metric records.
// Purpose: Provide the immutable records a receipt stores for each run.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Gate results and metrics carry scalar values only. Non-finite floats are
//! refused at serialization time so a malformed receipt is never written
//! (JSON has no encoding for `NaN` or infinities).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde::ser::Error as _;

// ============================================================================
// SECTION: Scalar Values
// ============================================================================

/// Scalar value stored in gate details and metric records.
///
/// # Invariants
/// - `Float` values must be finite to serialize.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Integer(i64),
    /// Unsigned integer value above `i64::MAX`.
    Unsigned(u64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
}

impl Serialize for ScalarValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Integer(value) => serializer.serialize_i64(*value),
            Self::Unsigned(value) => serializer.serialize_u64(*value),
            Self::Float(value) if value.is_finite() => serializer.serialize_f64(*value),
            Self::Float(value) => {
                Err(S::Error::custom(format!("non-finite float {value} cannot be serialized")))
            }
            Self::Text(value) => serializer.serialize_str(value),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => value.fmt(f),
            Self::Integer(value) => value.fmt(f),
            Self::Unsigned(value) => value.fmt(f),
            Self::Float(value) => value.fmt(f),
            Self::Text(value) => value.fmt(f),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u64> for ScalarValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::Unsigned(value), Self::Integer)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

// ============================================================================
// SECTION: Gate Results
// ============================================================================

/// Binary gate status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateStatus {
    /// Gate passed.
    Pass,
    /// Gate failed.
    Fail,
}

impl GateStatus {
    /// Maps a boolean decision onto a gate status.
    #[must_use]
    pub const fn from_passed(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }

    /// Returns the stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

/// Ordered gate details keyed by name.
pub type GateDetails = BTreeMap<String, ScalarValue>;

/// Outcome of a single named gate.
///
/// # Invariants
/// - Immutable after construction; fields are only readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateResult {
    /// Gate name.
    name: String,
    /// Pass/fail status.
    status: GateStatus,
    /// Optional policy metadata.
    details: Option<GateDetails>,
}

impl GateResult {
    /// Creates a gate result without details.
    #[must_use]
    pub fn new(name: impl Into<String>, status: GateStatus) -> Self {
        Self {
            name: name.into(),
            status,
            details: None,
        }
    }

    /// Creates a gate result with details.
    #[must_use]
    pub fn with_details(name: impl Into<String>, status: GateStatus, details: GateDetails) -> Self {
        Self {
            name: name.into(),
            status,
            details: Some(details),
        }
    }

    /// Returns the gate name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the gate status.
    #[must_use]
    pub const fn status(&self) -> GateStatus {
        self.status
    }

    /// Returns the gate details, if any.
    #[must_use]
    pub const fn details(&self) -> Option<&GateDetails> {
        self.details.as_ref()
    }

    /// Returns true when the gate passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == GateStatus::Pass
    }
}

// ============================================================================
// SECTION: Metrics
// ============================================================================

/// Named metric value recorded in a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricRecord {
    /// Metric name.
    pub name: String,
    /// Metric value.
    pub value: ScalarValue,
}

impl MetricRecord {
    /// Creates a metric record.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
