// crates/proof-bundle-core/src/core/policy.rs
// ============================================================================
// Module: Proof Bundle Gate Policies
// Description: Named comparison policies with explicit metric direction.
// Purpose: Define the policy vocabulary used by the gate evaluator and config.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every gate policy states whether lower or higher metric values are better.
//! Names that are not registered are handled according to an explicit
//! [`UnknownPolicyMode`] rather than an implicit assumption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Policy Types
// ============================================================================

/// Direction in which a metric improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDirection {
    /// Smaller values are better (error metrics).
    LowerIsBetter,
    /// Larger values are better (accuracy, win rate).
    HigherIsBetter,
}

impl MetricDirection {
    /// Returns the stable label for the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowerIsBetter => "lower_is_better",
            Self::HigherIsBetter => "higher_is_better",
        }
    }
}

/// Handling for policy names that are not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPolicyMode {
    /// Unknown names are an error.
    #[default]
    Reject,
    /// Unknown names use a strict `candidate < baseline` comparison.
    AssumeLowerIsBetter,
}

/// Named gate policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatePolicy {
    /// Policy name, matched case-insensitively.
    pub name: String,
    /// Metric direction.
    pub direction: MetricDirection,
}

impl GatePolicy {
    /// Creates a policy.
    #[must_use]
    pub fn new(name: impl Into<String>, direction: MetricDirection) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }
}

/// Built-in lower-is-better error metric policies.
pub const BUILTIN_LOWER_IS_BETTER: &[&str] = &["mae", "rmse"];

/// Normalizes a policy name for lookup.
#[must_use]
pub fn normalize_policy_name(name: &str) -> String {
    name.trim().to_lowercase()
}
