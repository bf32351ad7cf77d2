// crates/experiment-cli/src/main.rs
// ============================================================================
// Module: Experiment CLI Entry Point
// Description: Command dispatcher for experiment config workflows.
// Purpose: Validate, inspect, and document experiment configs from a shell.
// Dependencies: clap, experiment-config, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The `experiment` binary wraps the experiment-config library: it validates
//! config files (optionally recording an audit log), prints normalized records,
//! and emits the schema, example, and generated docs. Inputs are untrusted and
//! loading fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use experiment_config::ConfigAuditSink;
use experiment_config::ExperimentConfig;
use experiment_config::ExperimentLoader;
use experiment_config::FileAuditSink;
use experiment_config::KwargValue;
use experiment_config::NoopAuditSink;
use experiment_config::experiment_docs_markdown;
use experiment_config::experiment_schema;
use experiment_config::experiment_toml_example;
use experiment_config::verify_experiment_docs;
use experiment_config::write_experiment_docs;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "experiment", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate an experiment configuration file.
    Validate(ValidateCommand),
    /// Print a validated configuration in normalized form.
    Show(ShowCommand),
    /// Print the JSON schema for experiment configs.
    Schema,
    /// Print the canonical example configuration.
    Example,
    /// Print, verify, or write the generated config docs.
    Docs(DocsCommand),
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Config file path (`.json` is read as JSON, anything else as TOML).
    #[arg(long, value_name = "PATH")]
    config: PathBuf,
    /// Append JSON-line audit events to this file.
    #[arg(long = "audit-log", value_name = "PATH")]
    audit_log: Option<PathBuf>,
}

/// Arguments for `show`.
#[derive(Args, Debug)]
struct ShowCommand {
    /// Config file path.
    #[arg(long, value_name = "PATH")]
    config: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = ShowFormat::Toml)]
    format: ShowFormat,
    /// Derived model parameter applied before printing (`NAME=VALUE`, repeatable).
    #[arg(long = "derive", value_name = "NAME=VALUE")]
    derive: Vec<String>,
}

/// Output formats for `show`.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ShowFormat {
    /// TOML output.
    Toml,
    /// Pretty-printed JSON output.
    Json,
}

/// Arguments for `docs`.
#[derive(Args, Debug)]
struct DocsCommand {
    /// Verify the docs file at PATH matches the generated output.
    #[arg(long, value_name = "PATH", conflicts_with = "write")]
    check: Option<PathBuf>,
    /// Write the generated docs to PATH.
    #[arg(long, value_name = "PATH")]
    write: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
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
        write_stdout_line(&format!("experiment {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Validate(command) => command_validate(&command),
        Commands::Show(command) => command_show(&command),
        Commands::Schema => command_schema(),
        Commands::Example => command_example(),
        Commands::Docs(command) => command_docs(&command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    let help = command.render_help().to_string();
    write_stdout_line(help.trim_end()).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes `validate`.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let sink: Arc<dyn ConfigAuditSink> = match &command.audit_log {
        Some(path) => Arc::new(FileAuditSink::new(path).map_err(|err| {
            CliError::new(format!("failed to open audit log {}: {err}", path.display()))
        })?),
        None => Arc::new(NoopAuditSink),
    };
    let loader = ExperimentLoader::new(sink);
    let config = loader
        .load(command.config.as_path())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    for warning in config.warnings() {
        write_stderr_line(&format!("warning: {}", warning.message()))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    write_stdout_line(&format!("config ok: {}", command.config.display()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `show`.
fn command_show(command: &ShowCommand) -> CliResult<ExitCode> {
    let mut config = ExperimentConfig::load(command.config.as_path())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    for entry in &command.derive {
        let (name, value) = parse_derived_param(entry)?;
        config = config
            .with_derived_param(&name, value)
            .map_err(|err| CliError::new(format!("derived parameter rejected: {err}")))?;
    }
    let output = render_config(&config, command.format)?;
    write_stdout_line(output.trim_end())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Renders a configuration in the requested format.
fn render_config(config: &ExperimentConfig, format: ShowFormat) -> CliResult<String> {
    match format {
        ShowFormat::Toml => config
            .to_toml_string()
            .map_err(|err| CliError::new(format!("config encode failed: {err}"))),
        ShowFormat::Json => {
            let value = config
                .to_json_value()
                .map_err(|err| CliError::new(format!("config encode failed: {err}")))?;
            serde_json::to_string_pretty(&value)
                .map_err(|err| CliError::new(format!("config encode failed: {err}")))
        }
    }
}

/// Parses a `NAME=VALUE` derived parameter.
///
/// Values are read as `true`/`false`, then integer, then finite float, and
/// fall back to a string.
fn parse_derived_param(entry: &str) -> CliResult<(String, KwargValue)> {
    let Some((name, raw)) = entry.split_once('=') else {
        return Err(CliError::new(format!("derived parameter must be NAME=VALUE: {entry}")));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::new(format!("derived parameter name is empty: {entry}")));
    }
    let raw = raw.trim();
    let value = match raw {
        "true" => KwargValue::Bool(true),
        "false" => KwargValue::Bool(false),
        _ => {
            if let Ok(int) = raw.parse::<i64>() {
                KwargValue::Int(int)
            } else if let Ok(float) = raw.parse::<f64>()
                && float.is_finite()
            {
                KwargValue::Float(float)
            } else {
                KwargValue::Str(raw.to_string())
            }
        }
    };
    Ok((name.to_string(), value))
}

// ============================================================================
// SECTION: Artifact Commands
// ============================================================================

/// Executes `schema`.
fn command_schema() -> CliResult<ExitCode> {
    let schema = serde_json::to_string_pretty(&experiment_schema())
        .map_err(|err| CliError::new(format!("schema encode failed: {err}")))?;
    write_stdout_line(&schema).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `example`.
fn command_example() -> CliResult<ExitCode> {
    let example = experiment_toml_example();
    write_stdout_line(example.trim_end())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `docs`.
fn command_docs(command: &DocsCommand) -> CliResult<ExitCode> {
    if let Some(path) = &command.check {
        verify_experiment_docs(Some(path)).map_err(|err| CliError::new(err.to_string()))?;
        write_stdout_line(&format!("docs up to date: {}", path.display()))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(path) = &command.write {
        write_experiment_docs(Some(path)).map_err(|err| CliError::new(err.to_string()))?;
        write_stdout_line(&format!("docs written: {}", path.display()))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let docs = experiment_docs_markdown().map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(docs.trim_end()).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
