// crates/proof-bundle-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and `config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `proof-bundle.toml`. The example must always pass
//! validation; a test in this crate enforces it.

/// Returns a canonical example `proof-bundle.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[packet]
project_id = "PROOF_BUNDLE_DEMO"
packet_type = "PUBLIC"
version = "v0.1"
notes = "Evidence packet for the baseline comparison."

[run]
id_prefix = "RUN"

[gates]
unknown_policy = "reject"
default_min_improvement_frac = 0.02

[[gates.policies]]
name = "accuracy"
direction = "higher_is_better"

[hashing]
missing_files = "fail"

[output]
root = "."
receipts_dir = "runs/receipts"
manifest_name = "MANIFEST.json"

[logging]
level = "info"
"#,
    )
}
