// crates/proof-bundle-config/src/config.rs
// ============================================================================
// Module: Proof Bundle Configuration
// Description: Configuration loading and validation for proof bundles.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: proof-bundle-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! When no path is given and neither the environment variable nor the default
//! file is present, built-in defaults apply. An explicit path that cannot be
//! read, or any invalid value, fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use proof_bundle_core::DEFAULT_RUN_ID_PREFIX;
use proof_bundle_core::GateEvaluator;
use proof_bundle_core::GatePolicy;
use proof_bundle_core::MissingFilePolicy;
use proof_bundle_core::PacketDescriptor;
use proof_bundle_core::PipelineSettings;
use proof_bundle_core::UnknownPolicyMode;
use proof_bundle_core::identifiers::validate_prefix;
use proof_bundle_core::policy::normalize_policy_name;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "proof-bundle.toml";
/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "PROOF_BUNDLE_CONFIG";
/// Maximum config file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of configured gate policies.
pub(crate) const MAX_GATE_POLICIES: usize = 64;
/// Maximum length of packet metadata fields.
pub(crate) const MAX_PACKET_FIELD_LENGTH: usize = 256;
/// Maximum length of packet notes.
pub(crate) const MAX_PACKET_NOTES_LENGTH: usize = 4096;
/// Log levels accepted in `logging.level` directives.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Proof bundle configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProofBundleConfig {
    /// Packet metadata recorded in manifests.
    #[serde(default)]
    pub packet: PacketConfig,
    /// Run identifier settings.
    #[serde(default)]
    pub run: RunConfig,
    /// Gate policy settings.
    #[serde(default)]
    pub gates: GatesConfig,
    /// File hashing settings.
    #[serde(default)]
    pub hashing: HashingConfig,
    /// Output layout settings.
    #[serde(default)]
    pub output: OutputConfig,
    /// Diagnostic logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ProofBundleConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(resolved) = resolve_path(path)? else {
            return Ok(Self::default());
        };
        validate_path(&resolved)?;
        let bytes = read_config_bytes(&resolved)?;
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.packet.validate()?;
        self.run.validate()?;
        self.gates.validate()?;
        self.output.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Builds a gate evaluator with the configured policies registered.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a policy conflicts with a
    /// built-in or another configured policy.
    pub fn gate_evaluator(&self) -> Result<GateEvaluator, ConfigError> {
        let mut evaluator = GateEvaluator::new(self.gates.unknown_policy);
        for policy in &self.gates.policies {
            evaluator
                .register(policy)
                .map_err(|err| ConfigError::Invalid(format!("gates.policies: {err}")))?;
        }
        Ok(evaluator)
    }

    /// Returns the packet description for manifests.
    #[must_use]
    pub fn packet_descriptor(&self) -> PacketDescriptor {
        PacketDescriptor {
            project_id: self.packet.project_id.clone(),
            packet_type: self.packet.packet_type.clone(),
            version: self.packet.version.clone(),
            notes: self.packet.notes.clone(),
        }
    }

    /// Returns pipeline settings derived from this configuration.
    #[must_use]
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            packet: self.packet_descriptor(),
            run_id_prefix: self.run.id_prefix.clone(),
            default_min_improvement_frac: self.gates.default_min_improvement_frac,
            missing_files: self.hashing.missing_files,
            receipts_dir: self.output.receipts_dir.clone(),
            manifest_name: self.output.manifest_name.clone(),
        }
    }
}

/// Packet metadata configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacketConfig {
    /// Project identifier.
    #[serde(default = "default_project_id")]
    pub project_id: String,
    /// Packet type label.
    #[serde(default = "default_packet_type")]
    pub packet_type: String,
    /// Packet version label.
    #[serde(default = "default_packet_version")]
    pub version: String,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            packet_type: default_packet_type(),
            version: default_packet_version(),
            notes: String::new(),
        }
    }
}

impl PacketConfig {
    /// Validates packet metadata.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_label("packet.project_id", &self.project_id)?;
        validate_label("packet.packet_type", &self.packet_type)?;
        validate_label("packet.version", &self.version)?;
        if self.notes.len() > MAX_PACKET_NOTES_LENGTH {
            return Err(ConfigError::Invalid("packet.notes exceeds max length".to_string()));
        }
        Ok(())
    }
}

/// Run identifier configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Prefix for generated run identifiers.
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_id_prefix(),
        }
    }
}

impl RunConfig {
    /// Validates run identifier settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_prefix(&self.id_prefix)
            .map_err(|err| ConfigError::Invalid(format!("run.id_prefix: {err}")))
    }
}

/// Gate policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatesConfig {
    /// Handling for unregistered policy names.
    #[serde(default)]
    pub unknown_policy: UnknownPolicyMode,
    /// Fraction applied when a comparison does not set one.
    #[serde(default = "default_min_improvement_frac")]
    pub default_min_improvement_frac: f64,
    /// Additional named policies.
    #[serde(default)]
    pub policies: Vec<GatePolicy>,
}

impl Default for GatesConfig {
    fn default() -> Self {
        Self {
            unknown_policy: UnknownPolicyMode::default(),
            default_min_improvement_frac: default_min_improvement_frac(),
            policies: Vec::new(),
        }
    }
}

impl GatesConfig {
    /// Validates gate policy settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_min_improvement_frac.is_finite() {
            return Err(ConfigError::Invalid(
                "gates.default_min_improvement_frac must be finite".to_string(),
            ));
        }
        if self.policies.len() > MAX_GATE_POLICIES {
            return Err(ConfigError::Invalid("gates.policies exceeds max entries".to_string()));
        }
        let mut seen: Vec<String> = Vec::new();
        for policy in &self.policies {
            let name = normalize_policy_name(&policy.name);
            if name.is_empty() {
                return Err(ConfigError::Invalid("gates.policies.name must be set".to_string()));
            }
            if seen.contains(&name) {
                return Err(ConfigError::Invalid(format!(
                    "gates.policies: duplicate policy {name}"
                )));
            }
            seen.push(name);
        }
        let mut evaluator = GateEvaluator::new(self.unknown_policy);
        for policy in &self.policies {
            evaluator
                .register(policy)
                .map_err(|err| ConfigError::Invalid(format!("gates.policies: {err}")))?;
        }
        Ok(())
    }
}

/// File hashing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HashingConfig {
    /// Handling for declared files that are missing.
    #[serde(default = "default_missing_files")]
    pub missing_files: MissingFilePolicy,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            missing_files: default_missing_files(),
        }
    }
}

/// Output layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Bundle root directory.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Root-relative receipt directory.
    #[serde(default = "default_receipts_dir")]
    pub receipts_dir: PathBuf,
    /// Root-relative manifest file name; may contain `{run_id}`.
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            receipts_dir: default_receipts_dir(),
            manifest_name: default_manifest_name(),
        }
    }
}

impl OutputConfig {
    /// Validates output layout settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("output.root", &self.root.to_string_lossy())?;
        validate_path_string("output.receipts_dir", &self.receipts_dir.to_string_lossy())?;
        validate_relative("output.receipts_dir", &self.receipts_dir)?;
        validate_path_string("output.manifest_name", &self.manifest_name)?;
        validate_relative("output.manifest_name", Path::new(&self.manifest_name))?;
        Ok(())
    }
}

/// Diagnostic logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log filter, either a level or comma-separated `target=level` directives.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Validates the log filter syntax.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_log_filter(&self.level)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default project identifier.
fn default_project_id() -> String {
    "PROOF_BUNDLE_DEMO".to_string()
}

/// Default packet type.
fn default_packet_type() -> String {
    "PUBLIC".to_string()
}

/// Default packet version.
fn default_packet_version() -> String {
    "v0.1".to_string()
}

/// Default run identifier prefix.
fn default_id_prefix() -> String {
    DEFAULT_RUN_ID_PREFIX.to_string()
}

/// Default required improvement.
const fn default_min_improvement_frac() -> f64 {
    0.02
}

/// Default missing-file handling.
const fn default_missing_files() -> MissingFilePolicy {
    MissingFilePolicy::Fail
}

/// Default bundle root.
fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Default receipt directory.
fn default_receipts_dir() -> PathBuf {
    PathBuf::from("runs/receipts")
}

/// Default manifest name.
fn default_manifest_name() -> String {
    "MANIFEST.json".to_string()
}

/// Default log filter.
fn default_log_level() -> String {
    "info".to_string()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path: explicit, then environment, then default name.
///
/// Returns `None` when only the default name applies and it does not exist.
fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default.is_file().then_some(default))
}

/// Reads the config file, refusing anything over the size limit.
fn read_config_bytes(path: &Path) -> Result<Vec<u8>, ConfigError> {
    let io_error = |err: std::io::Error| ConfigError::Io(format!("{}: {err}", path.display()));
    let file = File::open(path).map_err(io_error)?;
    let limit = u64::try_from(MAX_CONFIG_FILE_SIZE).unwrap_or(u64::MAX);
    if file.metadata().map_err(io_error)?.len() > limit {
        return Err(oversized_config());
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(io_error)?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(oversized_config());
    }
    Ok(bytes)
}

/// Error for a config file over the size limit.
fn oversized_config() -> ConfigError {
    ConfigError::Invalid("config file exceeds size limit".to_string())
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} component too long")));
        }
    }
    Ok(())
}

/// Rejects absolute paths and parent-directory components.
fn validate_relative(field: &str, path: &Path) -> Result<(), ConfigError> {
    for component in path.components() {
        match component {
            Component::ParentDir => {
                return Err(ConfigError::Invalid(format!("{field} must not contain '..'")));
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(ConfigError::Invalid(format!("{field} must be relative")));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    Ok(())
}

/// Validates a packet label.
fn validate_label(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_PACKET_FIELD_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

/// Validates a log filter of the form `level` or `target=level[,..]`.
fn validate_log_filter(filter: &str) -> Result<(), ConfigError> {
    if filter.trim().is_empty() {
        return Err(ConfigError::Invalid("logging.level must be non-empty".to_string()));
    }
    for directive in filter.split(',') {
        let directive = directive.trim();
        let (target, level) = match directive.split_once('=') {
            Some((target, level)) => (Some(target), level),
            None => (None, directive),
        };
        let target_ok = target.is_none_or(|target| {
            !target.is_empty() && target.chars().all(is_target_char)
        });
        let level_ok = LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str());
        if !target_ok || !level_ok {
            return Err(ConfigError::Invalid(format!(
                "logging.level has invalid directive '{directive}'"
            )));
        }
    }
    Ok(())
}

/// Returns true when `ch` may appear in a log target.
const fn is_target_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | ':' | '-')
}
