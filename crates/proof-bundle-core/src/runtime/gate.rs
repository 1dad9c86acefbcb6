// crates/proof-bundle-core/src/runtime/gate.rs
// ============================================================================
// Module: Proof Bundle Gate Evaluation
// Description: Baseline-versus-candidate metric gates.
// Purpose: Decide whether a candidate beats a baseline under a named policy.
// Dependencies: crate::core::{gate, policy}, thiserror
// ============================================================================

//! ## Overview
//! The evaluator holds a registry of named policies, each with an explicit
//! [`MetricDirection`]. Lookup trims and lowercases the name. Names that are
//! not registered are rejected unless the evaluator was built with
//! [`UnknownPolicyMode::AssumeLowerIsBetter`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::GateDetails;
use crate::core::GatePolicy;
use crate::core::GateResult;
use crate::core::GateStatus;
use crate::core::MetricDirection;
use crate::core::ScalarValue;
use crate::core::UnknownPolicyMode;
use crate::core::policy::BUILTIN_LOWER_IS_BETTER;
use crate::core::policy::normalize_policy_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Direction label recorded when an unknown policy falls back to `<`.
pub const ASSUMED_DIRECTION_LABEL: &str = "assumed_lower_is_better";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gate evaluation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GateError {
    /// Policy name is not registered and the evaluator rejects unknown names.
    #[error("unknown gate policy: {policy}")]
    UnknownPolicy {
        /// Normalized policy name.
        policy: String,
    },
    /// A numeric input is NaN or infinite.
    #[error("non-finite {field}: {value}")]
    NonFinite {
        /// Input name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// Policy name is already registered with a different direction.
    #[error("gate policy already registered: {policy}")]
    DuplicatePolicy {
        /// Normalized policy name.
        policy: String,
    },
}

// ============================================================================
// SECTION: Comparison Rule
// ============================================================================

/// Resolved comparison for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    /// Registered policy with a known direction.
    Directional(MetricDirection),
    /// Unknown policy evaluated as strict `candidate < baseline`.
    AssumedLowerIsBetter,
}

impl Rule {
    /// Returns the direction label recorded in gate details.
    const fn label(self) -> &'static str {
        match self {
            Self::Directional(direction) => direction.as_str(),
            Self::AssumedLowerIsBetter => ASSUMED_DIRECTION_LABEL,
        }
    }

    /// Applies the rule.
    fn passes(self, baseline: f64, candidate: f64, fraction: f64) -> bool {
        match self {
            Self::Directional(MetricDirection::LowerIsBetter) => {
                candidate <= baseline * (1.0 - fraction)
            }
            Self::Directional(MetricDirection::HigherIsBetter) => {
                candidate >= baseline * (1.0 + fraction)
            }
            Self::AssumedLowerIsBetter => candidate < baseline,
        }
    }
}

// ============================================================================
// SECTION: Gate Evaluator
// ============================================================================

/// Registry-backed baseline gate evaluator.
#[derive(Debug, Clone)]
pub struct GateEvaluator {
    /// Directions keyed by normalized policy name.
    policies: BTreeMap<String, MetricDirection>,
    /// Handling for unregistered names.
    unknown: UnknownPolicyMode,
}

impl Default for GateEvaluator {
    fn default() -> Self {
        Self::new(UnknownPolicyMode::default())
    }
}

impl GateEvaluator {
    /// Creates an evaluator with the built-in error-metric policies.
    #[must_use]
    pub fn new(unknown: UnknownPolicyMode) -> Self {
        let policies = BUILTIN_LOWER_IS_BETTER
            .iter()
            .map(|name| ((*name).to_string(), MetricDirection::LowerIsBetter))
            .collect();
        Self {
            policies,
            unknown,
        }
    }

    /// Returns the handling for unregistered names.
    #[must_use]
    pub const fn unknown_policy_mode(&self) -> UnknownPolicyMode {
        self.unknown
    }

    /// Registers a policy.
    ///
    /// Re-registering a name with the same direction is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::DuplicatePolicy`] when the name is already
    /// registered with a different direction.
    pub fn register(&mut self, policy: &GatePolicy) -> Result<(), GateError> {
        let name = normalize_policy_name(&policy.name);
        match self.policies.get(&name) {
            Some(existing) if *existing == policy.direction => Ok(()),
            Some(_) => Err(GateError::DuplicatePolicy {
                policy: name,
            }),
            None => {
                self.policies.insert(name, policy.direction);
                Ok(())
            }
        }
    }

    /// Returns the registered direction for a policy name, if any.
    #[must_use]
    pub fn direction(&self, policy: &str) -> Option<MetricDirection> {
        self.policies.get(&normalize_policy_name(policy)).copied()
    }

    /// Returns true when a candidate metric beats the baseline.
    ///
    /// A fraction of zero means "not worse"; negative fractions relax the bar.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::NonFinite`] for NaN or infinite inputs and
    /// [`GateError::UnknownPolicy`] for rejected names.
    pub fn evaluate(
        &self,
        policy: &str,
        baseline: f64,
        candidate: f64,
        min_improvement_frac: f64,
    ) -> Result<bool, GateError> {
        self.decide(policy, baseline, candidate, min_improvement_frac).map(|(_, passed)| passed)
    }

    /// Evaluates a comparison and wraps the decision as a named gate result.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] under the same conditions as [`Self::evaluate`].
    pub fn gate(
        &self,
        gate_name: &str,
        policy: &str,
        baseline: f64,
        candidate: f64,
        min_improvement_frac: f64,
    ) -> Result<GateResult, GateError> {
        let (rule, passed) = self.decide(policy, baseline, candidate, min_improvement_frac)?;
        let mut details = GateDetails::new();
        details.insert("metric".to_string(), ScalarValue::from(normalize_policy_name(policy)));
        details.insert("min_improvement_frac".to_string(), ScalarValue::from(min_improvement_frac));
        details.insert("direction".to_string(), ScalarValue::from(rule.label()));
        details.insert("baseline".to_string(), ScalarValue::from(baseline));
        details.insert("candidate".to_string(), ScalarValue::from(candidate));
        tracing::debug!(
            gate = gate_name,
            policy = rule.label(),
            baseline,
            candidate,
            passed,
            "evaluated gate"
        );
        Ok(GateResult::with_details(gate_name, GateStatus::from_passed(passed), details))
    }

    /// Validates inputs, resolves the rule, and applies it.
    fn decide(
        &self,
        policy: &str,
        baseline: f64,
        candidate: f64,
        min_improvement_frac: f64,
    ) -> Result<(Rule, bool), GateError> {
        ensure_finite("baseline", baseline)?;
        ensure_finite("candidate", candidate)?;
        ensure_finite("min_improvement_frac", min_improvement_frac)?;
        let rule = self.rule_for(policy)?;
        Ok((rule, rule.passes(baseline, candidate, min_improvement_frac)))
    }

    /// Resolves the comparison rule for a policy name.
    fn rule_for(&self, policy: &str) -> Result<Rule, GateError> {
        let name = normalize_policy_name(policy);
        if let Some(direction) = self.policies.get(&name) {
            return Ok(Rule::Directional(*direction));
        }
        match self.unknown {
            UnknownPolicyMode::Reject => Err(GateError::UnknownPolicy {
                policy: name,
            }),
            UnknownPolicyMode::AssumeLowerIsBetter => {
                tracing::warn!(policy = %name, "unknown gate policy; assuming lower is better");
                Ok(Rule::AssumedLowerIsBetter)
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects NaN and infinite inputs.
fn ensure_finite(field: &'static str, value: f64) -> Result<(), GateError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GateError::NonFinite {
            field,
            value,
        })
    }
}
