// crates/ontology-gate-cli/src/main.rs
// ============================================================================
// Module: Ontology Gate CLI Entry Point
// Description: Command dispatcher for config checks and access explanations.
// Purpose: Validate configuration and explain gate decisions offline.
// Dependencies: clap, ontology-gate-config, ontology-gate-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The `ontology-gate` CLI validates `ontology-gate.toml`, prints the
//! capability set a caller would receive for a tenant, and runs the
//! provenance arbiter on a pair of labels. All user-facing strings are routed
//! through the i18n catalog. Inputs are untrusted and validated before use.

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use ontology_gate_cli::i18n::Locale;
use ontology_gate_cli::i18n::set_locale;
use ontology_gate_cli::reports::ReportError;
use ontology_gate_cli::reports::capabilities_report;
use ontology_gate_cli::reports::precedence_report;
use ontology_gate_cli::t;
use ontology_gate_config::OntologyGateConfig;
use ontology_gate_config::config_toml_example;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "ONTOLOGY_GATE_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "ontology-gate", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `ONTOLOGY_GATE_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Print the operations a caller may invoke for a tenant.
    Capabilities(CapabilitiesCommand),
    /// Decide whether a modifier may overwrite a record.
    Precedence(PrecedenceCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a config file.
    Validate(ConfigArgs),
    /// Print a canonical example config.
    Example,
}

/// Config file selection.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Config file path (defaults to ontology-gate.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for the capabilities report.
#[derive(Args, Debug)]
struct CapabilitiesCommand {
    /// Tenant id (UUID).
    #[arg(long, value_name = "UUID")]
    tenant: String,
    /// Caller subject; `agent` selects the agent credential class.
    #[arg(long, value_name = "SUBJECT")]
    subject: String,
    /// Role claim; repeatable.
    #[arg(long = "role", value_name = "ROLE")]
    roles: Vec<String>,
    /// Config file with tool groups and features; empty config when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for the precedence report.
#[derive(Args, Debug)]
struct PrecedenceCommand {
    /// Persisted creator label.
    #[arg(long, value_name = "LABEL")]
    source: String,
    /// Persisted last-edit label.
    #[arg(long, value_name = "LABEL")]
    last_edit_source: Option<String>,
    /// Proposed modifier: manual, mcp, or inferred.
    #[arg(long, value_name = "PROVENANCE")]
    modifier: String,
}

/// Language selection.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

impl From<ReportError> for CliError {
    fn from(error: ReportError) -> Self {
        let message = match error {
            ReportError::InvalidTenant {
                tenant,
                reason,
            } => t!("capabilities.tenant_invalid", tenant = tenant, error = reason),
            ReportError::UnknownModifier(modifier) => {
                t!("precedence.modifier_invalid", modifier = modifier)
            }
        };
        Self::new(message)
    }
}

/// CLI result alias.
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

/// Executes the command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        write_stdout_line(&t!("main.version", version = env!("CARGO_PKG_VERSION")))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Capabilities(command) => command_capabilities(&command),
        Commands::Precedence(command) => command_precedence(&command),
    }
}

/// Picks the locale from the flag, then the environment.
fn resolve_locale(flag: Option<LangArg>, env_value: Option<&str>) -> CliResult<Locale> {
    if let Some(flag) = flag {
        return Ok(flag.into());
    }
    match env_value {
        None => Ok(Locale::En),
        Some(value) => Locale::parse(value)
            .ok_or_else(|| CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))),
    }
}

/// Prints clap help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    let help = command.render_help().to_string();
    write_stdout_line(&help).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(args) => {
            load_config(&args)?;
            write_stdout_line(&t!("config.validate.ok"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        ConfigCommand::Example => {
            write_stdout_line(config_toml_example().trim_end())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Loads config from the explicit path, env override, or default file.
fn load_config(args: &ConfigArgs) -> CliResult<OntologyGateConfig> {
    OntologyGateConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

// ============================================================================
// SECTION: Report Commands
// ============================================================================

/// Executes the capabilities report.
fn command_capabilities(command: &CapabilitiesCommand) -> CliResult<ExitCode> {
    let config = match &command.config {
        Some(path) => load_config(&ConfigArgs {
            config: Some(path.clone()),
        })?,
        None => OntologyGateConfig::default(),
    };
    let report =
        capabilities_report(&config, &command.tenant, &command.subject, command.roles.iter().cloned())?;
    write_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the precedence report.
///
/// Exits with failure when the modification would be blocked.
fn command_precedence(command: &PrecedenceCommand) -> CliResult<ExitCode> {
    let report = precedence_report(
        &command.source,
        command.last_edit_source.as_deref(),
        &command.modifier,
    )?;
    write_json(&report)?;
    if report.outcome.is_allowed() { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::FAILURE) }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Renders a value as pretty JSON.
fn render_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))
}

/// Writes a value as pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = render_json(value)?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
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
