// crates/proof-bundle-config/src/lib.rs
// ============================================================================
// Module: Proof Bundle Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for proof-bundle.toml semantics.
// Dependencies: proof-bundle-core, serde, toml
// ============================================================================

//! ## Overview
//! `proof-bundle-config` defines the configuration model for proof bundle
//! runs. It provides strict, fail-closed validation and converts a validated
//! config into the gate evaluator and pipeline settings used by the core.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
