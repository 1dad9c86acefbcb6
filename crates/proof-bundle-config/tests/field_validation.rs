//! Field validation tests for proof-bundle-config.
// crates/proof-bundle-config/tests/field_validation.rs
// =============================================================================
// Module: Config Field Validation Tests
// Description: Validate per-section value checks.
// Purpose: Ensure invalid values are rejected before any run starts.
// =============================================================================

use proof_bundle_config::ConfigError;
use proof_bundle_config::ProofBundleConfig;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<ProofBundleConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

// ============================================================================
// SECTION: Packet + Run
// ============================================================================

#[test]
fn packet_rejects_blank_project_id() -> TestResult {
    let toml = "[packet]\nproject_id = \"   \"\n";
    assert_invalid(ProofBundleConfig::from_toml_str(toml), "packet.project_id must be non-empty")
}

#[test]
fn packet_rejects_oversized_notes() -> TestResult {
    let toml = format!("[packet]\nnotes = \"{}\"\n", "n".repeat(5_000));
    assert_invalid(ProofBundleConfig::from_toml_str(&toml), "packet.notes exceeds max length")
}

#[test]
fn run_rejects_prefix_with_space() -> TestResult {
    let toml = "[run]\nid_prefix = \"MY RUN\"\n";
    assert_invalid(ProofBundleConfig::from_toml_str(toml), "run.id_prefix")
}

#[test]
fn run_rejects_empty_prefix() -> TestResult {
    let toml = "[run]\nid_prefix = \"\"\n";
    assert_invalid(ProofBundleConfig::from_toml_str(toml), "run.id_prefix")
}

// ============================================================================
// SECTION: Gates
// ============================================================================

#[test]
fn gates_reject_non_finite_fraction() -> TestResult {
    let toml = "[gates]\ndefault_min_improvement_frac = nan\n";
    assert_invalid(ProofBundleConfig::from_toml_str(toml), "must be finite")
}

#[test]
fn gates_reject_duplicate_policies() -> TestResult {
    let toml = r#"
[[gates.policies]]
name = "accuracy"
direction = "higher_is_better"

[[gates.policies]]
name = "Accuracy"
direction = "higher_is_better"
"#;
    assert_invalid(ProofBundleConfig::from_toml_str(toml), "duplicate policy accuracy")
}

#[test]
fn gates_reject_builtin_direction_flip() -> TestResult {
    let toml = "[[gates.policies]]\nname = \"rmse\"\ndirection = \"higher_is_better\"\n";
    assert_invalid(ProofBundleConfig::from_toml_str(toml), "gates.policies")
}

#[test]
fn gates_reject_unknown_direction() -> TestResult {
    let toml = "[[gates.policies]]\nname = \"auc\"\ndirection = \"sideways\"\n";
    assert_invalid(ProofBundleConfig::from_toml_str(toml), "config parse error")
}

#[test]
fn gates_accept_assume_lower_is_better() -> TestResult {
    let toml = "[gates]\nunknown_policy = \"assume_lower_is_better\"\n";
    ProofBundleConfig::from_toml_str(toml).map(|_| ()).map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Output + Logging
// ============================================================================

#[test]
fn output_rejects_escaping_receipts_dir() -> TestResult {
    let toml = "[output]\nreceipts_dir = \"../receipts\"\n";
    assert_invalid(ProofBundleConfig::from_toml_str(toml), "output.receipts_dir must not contain")
}

#[test]
fn output_rejects_absolute_manifest_name() -> TestResult {
    let toml = "[output]\nmanifest_name = \"/tmp/MANIFEST.json\"\n";
    assert_invalid(ProofBundleConfig::from_toml_str(toml), "output.manifest_name must be relative")
}

#[test]
fn output_rejects_empty_root() -> TestResult {
    let toml = "[output]\nroot = \"\"\n";
    assert_invalid(ProofBundleConfig::from_toml_str(toml), "output.root must be non-empty")
}

#[test]
fn logging_accepts_target_directives() -> TestResult {
    let toml = "[logging]\nlevel = \"warn,proof_bundle_core=debug\"\n";
    ProofBundleConfig::from_toml_str(toml).map(|_| ()).map_err(|err| err.to_string())
}

#[test]
fn logging_rejects_unknown_level() -> TestResult {
    let toml = "[logging]\nlevel = \"verbose\"\n";
    assert_invalid(ProofBundleConfig::from_toml_str(toml), "invalid directive 'verbose'")
}
