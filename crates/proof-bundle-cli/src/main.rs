// crates/proof-bundle-cli/src/main.rs
// ============================================================================
// Module: Proof Bundle CLI Entry Point
// Description: Command dispatcher for proof bundle build and audit workflows.
// Purpose: Provide a safe CLI for producing and verifying proof bundles.
// Dependencies: clap, proof-bundle-core, proof-bundle-config, serde, tracing.
// ============================================================================

//! ## Overview
//! The proof-bundle CLI builds receipts and manifests from a run submission,
//! verifies existing bundles offline, and exposes the hashing, gate, and run
//! identifier primitives for scripting. All user-facing strings are routed
//! through the message catalog; diagnostics go to stderr through `tracing`.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use proof_bundle_cli::t;
use proof_bundle_config::ProofBundleConfig;
use proof_bundle_config::config_toml_example;
use proof_bundle_core::BundleOutcome;
use proof_bundle_core::Clock;
use proof_bundle_core::FixedClock;
use proof_bundle_core::GateEvaluator;
use proof_bundle_core::GateResult;
use proof_bundle_core::HashEngine;
use proof_bundle_core::HostEnvironment;
use proof_bundle_core::ManifestVerifier;
use proof_bundle_core::ProofBundlePipeline;
use proof_bundle_core::RunId;
use proof_bundle_core::RunSubmission;
use proof_bundle_core::SystemClock;
use proof_bundle_core::Timestamp;
use proof_bundle_core::VerificationReport;
use proof_bundle_core::VerificationStatus;
use proof_bundle_core::canonical_pretty_json;
use proof_bundle_core::hashing::canonical_json_bytes;
use proof_bundle_core::load_manifest;
use proof_bundle_core::runtime::store::MAX_DOCUMENT_BYTES;
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable consulted for the log filter.
const LOG_ENV: &str = "RUST_LOG";
/// Filter used when the requested filter cannot be parsed.
const FALLBACK_LOG_FILTER: &str = "info";
/// Runtime label recorded in receipt environment fingerprints.
const PRODUCER: &str = concat!("proof-bundle/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "proof-bundle", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Config file path (overrides `PROOF_BUNDLE_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Log filter (overrides `RUST_LOG` and `[logging].level`).
    #[arg(long = "log-level", value_name = "FILTER", global = true)]
    log_level: Option<String>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a receipt and manifest from a run submission.
    Build(BuildCommand),
    /// Verify a manifest against the files on disk.
    Verify(VerifyCommand),
    /// Generate a run identifier.
    RunId(RunIdCommand),
    /// Hash files relative to a bundle root.
    Hash(HashCommand),
    /// Evaluate a single metric gate.
    Gate(GateCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for the `build` command.
#[derive(Args, Debug)]
struct BuildCommand {
    /// Run submission JSON file.
    #[arg(long, value_name = "PATH")]
    submission: PathBuf,
    /// Bundle root (overrides `[output].root`).
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,
    /// Explicit run identifier (overrides the submission).
    #[arg(long = "run-id", value_name = "RUN_ID")]
    run_id: Option<String>,
    /// Fixed wall-clock time for reproducible bundles (RFC 3339).
    #[arg(long = "fixed-time", value_name = "RFC3339")]
    fixed_time: Option<String>,
}

/// Arguments for the `verify` command.
#[derive(Args, Debug)]
struct VerifyCommand {
    /// Manifest JSON file.
    #[arg(long, value_name = "PATH")]
    manifest: PathBuf,
    /// Bundle root the manifest paths are relative to (overrides `[output].root`).
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,
    /// Report output format.
    #[arg(long, value_enum, default_value_t = VerifyFormat::Json)]
    format: VerifyFormat,
}

/// Arguments for the `run-id` command.
#[derive(Args, Debug)]
struct RunIdCommand {
    /// Identifier prefix (overrides `[run].id_prefix`).
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,
}

/// Arguments for the `hash` command.
#[derive(Args, Debug)]
struct HashCommand {
    /// Files to hash.
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,
    /// Root the paths are resolved against (overrides `[output].root`).
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,
}

/// Arguments for the `gate` command.
#[derive(Args, Debug)]
struct GateCommand {
    /// Gate name recorded in the result.
    #[arg(long, value_name = "NAME", default_value = "baseline_win")]
    name: String,
    /// Metric policy name.
    #[arg(long, value_name = "POLICY")]
    policy: String,
    /// Baseline metric value.
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    baseline: f64,
    /// Candidate metric value.
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    candidate: f64,
    /// Required relative improvement (overrides the configured default).
    #[arg(long = "min-improvement-frac", value_name = "FRACTION", allow_negative_numbers = true)]
    min_improvement_frac: Option<f64>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the resolved configuration.
    Validate,
    /// Print a canonical example configuration.
    Example,
}

/// Output formats for verification reports.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum VerifyFormat {
    /// Canonical JSON output.
    Json,
    /// Markdown summary output.
    Markdown,
}

/// Summary printed after a successful build.
#[derive(Debug, Serialize)]
struct BuildSummary<'a> {
    /// Run identifier.
    run_id: &'a str,
    /// Root-relative receipt path.
    receipt: &'a str,
    /// Manifest path on disk.
    manifest: String,
    /// Manifest digest.
    manifest_sha256: &'a str,
    /// True when every gate passed.
    all_gates_passed: bool,
    /// Gate results in evaluation order.
    gates: &'a [GateResult],
}

impl<'a> BuildSummary<'a> {
    /// Summarizes a pipeline outcome.
    fn from_outcome(outcome: &'a BundleOutcome) -> Self {
        let receipt = outcome.receipt.receipt();
        Self {
            run_id: receipt.run_id().as_str(),
            receipt: outcome.receipt.path(),
            manifest: outcome.manifest_path.display().to_string(),
            manifest_sha256: outcome.manifest.manifest_sha256().as_str(),
            all_gates_passed: receipt.all_gates_passed(),
            gates: receipt.gates(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog-formatted error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a formatted message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    if let Commands::Config {
        command: ConfigCommand::Example,
    } = command
    {
        return command_config_example();
    }

    let config = ProofBundleConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let env_filter = std::env::var(LOG_ENV).ok();
    init_logging(resolve_log_filter(
        cli.log_level.as_deref(),
        env_filter.as_deref(),
        &config.logging.level,
    ))?;

    match command {
        Commands::Build(command) => command_build(command, &config),
        Commands::Verify(command) => command_verify(&command, &config),
        Commands::RunId(command) => command_run_id(&command, &config),
        Commands::Hash(command) => command_hash(&command, &config),
        Commands::Gate(command) => command_gate(&command, &config),
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Picks the first non-blank filter: flag, then environment, then config.
fn resolve_log_filter<'a>(
    flag: Option<&'a str>,
    env_filter: Option<&'a str>,
    configured: &'a str,
) -> &'a str {
    flag.into_iter().chain(env_filter).find(|value| !value.trim().is_empty()).unwrap_or(configured)
}

/// Installs the stderr diagnostics subscriber.
fn init_logging(filter: &str) -> CliResult<()> {
    let filter = match EnvFilter::try_new(filter) {
        Ok(parsed) => parsed,
        Err(_) => {
            write_stderr_line(&t!(
                "logging.filter_invalid",
                filter = filter,
                fallback = FALLBACK_LOG_FILTER
            ))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            EnvFilter::new(FALLBACK_LOG_FILTER)
        }
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
    Ok(())
}

// ============================================================================
// SECTION: Build Command
// ============================================================================

/// Executes the `build` command.
fn command_build(command: BuildCommand, config: &ProofBundleConfig) -> CliResult<ExitCode> {
    let mut submission = read_submission(&command.submission)?;
    if let Some(run_id) = command.run_id.as_deref() {
        let parsed = RunId::parse(run_id).map_err(|err| {
            CliError::new(t!("build.run_id_invalid", run_id = run_id, error = err))
        })?;
        submission.run_id = Some(parsed);
    }
    let evaluator = config
        .gate_evaluator()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let root = command.root.unwrap_or_else(|| config.output.root.clone());

    let outcome = match command.fixed_time.as_deref() {
        Some(value) => {
            let at = Timestamp::parse(value).map_err(|err| {
                CliError::new(t!("build.fixed_time_invalid", value = value, error = err))
            })?;
            run_pipeline(root, config, evaluator, FixedClock(at), submission)?
        }
        None => run_pipeline(root, config, evaluator, SystemClock, submission)?,
    };

    write_json(&BuildSummary::from_outcome(&outcome))?;
    Ok(ExitCode::SUCCESS)
}

/// Runs the pipeline with the supplied clock.
fn run_pipeline<C: Clock>(
    root: PathBuf,
    config: &ProofBundleConfig,
    evaluator: GateEvaluator,
    clock: C,
    submission: RunSubmission,
) -> CliResult<BundleOutcome> {
    let pipeline = ProofBundlePipeline::new(
        root,
        config.pipeline_settings(),
        evaluator,
        clock,
        HostEnvironment::new(PRODUCER),
    )
    .map_err(|err| CliError::new(t!("build.failed", error = err)))?;
    pipeline.run(submission).map_err(|err| CliError::new(t!("build.failed", error = err)))
}

/// Reads and parses a run submission.
fn read_submission(path: &Path) -> CliResult<RunSubmission> {
    let kind = t!("input.kind.submission");
    let bytes = read_bytes_with_limit(path, MAX_DOCUMENT_BYTES).map_err(|err| match err {
        ReadLimitError::Io(error) => CliError::new(t!(
            "input.read_failed",
            kind = kind,
            path = path.display(),
            error = error
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    })?;
    serde_json::from_slice(&bytes).map_err(|err| {
        CliError::new(t!("build.submission_invalid", path = path.display(), error = err))
    })
}

// ============================================================================
// SECTION: Verify Command
// ============================================================================

/// Executes the `verify` command.
fn command_verify(command: &VerifyCommand, config: &ProofBundleConfig) -> CliResult<ExitCode> {
    let manifest = load_manifest(&command.manifest).map_err(|err| {
        CliError::new(t!("verify.load_failed", path = command.manifest.display(), error = err))
    })?;
    let root = command.root.clone().unwrap_or_else(|| config.output.root.clone());

    let report = ManifestVerifier::new(root).verify(&manifest);

    let output = render_verification_report(command.format, &report)?;
    write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;

    let exit_code = match report.status {
        VerificationStatus::Pass => ExitCode::SUCCESS,
        VerificationStatus::Fail => ExitCode::FAILURE,
    };
    Ok(exit_code)
}

/// Renders a verification report in the requested format.
fn render_verification_report(
    format: VerifyFormat,
    report: &VerificationReport,
) -> CliResult<String> {
    match format {
        VerifyFormat::Json => {
            let bytes = canonical_json_bytes(report)
                .map_err(|err| CliError::new(t!("verify.render_failed", error = err)))?;
            String::from_utf8(bytes)
                .map_err(|err| CliError::new(t!("verify.render_failed", error = err)))
        }
        VerifyFormat::Markdown => Ok(render_verification_markdown(report)),
    }
}

/// Formats a verification report as markdown.
fn render_verification_markdown(report: &VerificationReport) -> String {
    let mut output = String::new();
    output.push_str(&t!("verify.md.header"));
    output.push('\n');
    output.push('\n');
    output.push_str(&t!("verify.md.status", status = format_verification_status(report.status)));
    output.push('\n');
    output.push_str(&t!("verify.md.checked", count = report.checked_files));
    output.push('\n');
    output.push('\n');
    output.push_str(&t!("verify.md.errors_header"));
    output.push('\n');

    if report.errors.is_empty() {
        output.push_str(&t!("verify.md.no_errors"));
        output.push('\n');
        return output;
    }

    for error in &report.errors {
        output.push_str(&t!("verify.md.error_line", error = error));
        output.push('\n');
    }

    output
}

/// Returns the display label for a verification status.
fn format_verification_status(status: VerificationStatus) -> String {
    match status {
        VerificationStatus::Pass => t!("verify.status.pass"),
        VerificationStatus::Fail => t!("verify.status.fail"),
    }
}

// ============================================================================
// SECTION: Primitive Commands
// ============================================================================

/// Executes the `run-id` command.
fn command_run_id(command: &RunIdCommand, config: &ProofBundleConfig) -> CliResult<ExitCode> {
    let prefix = command.prefix.as_deref().unwrap_or(&config.run.id_prefix);
    let run_id = RunId::generate(prefix, SystemClock.now())
        .map_err(|err| CliError::new(t!("run_id.failed", error = err)))?;
    write_stdout_line(run_id.as_str()).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `hash` command.
fn command_hash(command: &HashCommand, config: &ProofBundleConfig) -> CliResult<ExitCode> {
    let root = command.root.clone().unwrap_or_else(|| config.output.root.clone());
    let digests = HashEngine::new(root)
        .hash_file_set(command.paths.as_slice())
        .resolve(config.hashing.missing_files)
        .map_err(|err| CliError::new(t!("hash.failed", error = err)))?;
    write_json(&digests)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `gate` command; the exit code reflects the gate status.
fn command_gate(command: &GateCommand, config: &ProofBundleConfig) -> CliResult<ExitCode> {
    let evaluator = config
        .gate_evaluator()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let fraction =
        command.min_improvement_frac.unwrap_or(config.gates.default_min_improvement_frac);
    let result = evaluator
        .gate(&command.name, &command.policy, command.baseline, command.candidate, fraction)
        .map_err(|err| CliError::new(t!("gate.failed", error = err)))?;
    write_json(&result)?;
    if result.passed() { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::FAILURE) }
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands that need a loaded configuration.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            write_stdout_line(&t!("config.validate.ok"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
        ConfigCommand::Example => command_config_example(),
    }
}

/// Prints the canonical example configuration.
fn command_config_example() -> CliResult<ExitCode> {
    write_stdout_bytes(config_toml_example().as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes sorted, indented JSON with a trailing newline to stdout.
fn write_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let bytes = canonical_pretty_json(value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
