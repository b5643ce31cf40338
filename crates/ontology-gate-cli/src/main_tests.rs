// crates/ontology-gate-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and dispatcher helpers.
// Purpose: Ensure CLI inputs are parsed and rejected consistently.
// Dependencies: ontology-gate-cli main helpers
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use clap::CommandFactory;
use clap::Parser;
use ontology_gate_cli::reports::precedence_report;
use serde_json::Value;

use super::Cli;
use super::CliError;
use super::Commands;
use super::ConfigCommand;
use super::LangArg;
use super::Locale;
use super::render_json;
use super::resolve_locale;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn capabilities_accepts_repeated_roles() {
    let cli = Cli::try_parse_from([
        "ontology-gate",
        "capabilities",
        "--tenant",
        "3b0f8a52-6c0e-4f8e-9a57-0c2f4d1b7e11",
        "--subject",
        "agent",
        "--role",
        "admin",
        "--role",
        "user",
    ])
    .unwrap();
    let Some(Commands::Capabilities(command)) = cli.command else {
        panic!("expected capabilities command");
    };
    assert_eq!(command.roles, vec!["admin".to_string(), "user".to_string()]);
    assert!(command.config.is_none());
}

#[test]
fn precedence_requires_a_modifier() {
    let parsed = Cli::try_parse_from(["ontology-gate", "precedence", "--source", "manual"]);
    assert!(parsed.is_err());
}

#[test]
fn config_validate_takes_optional_path() {
    let cli = Cli::try_parse_from(["ontology-gate", "config", "validate", "--config", "gate.toml"])
        .unwrap();
    let Some(Commands::Config {
        command: ConfigCommand::Validate(args),
    }) = cli.command
    else {
        panic!("expected config validate");
    };
    assert_eq!(args.config.unwrap().to_str(), Some("gate.toml"));
}

#[test]
fn locale_flag_wins_over_environment() {
    assert_eq!(resolve_locale(Some(LangArg::En), Some("ca")).unwrap(), Locale::En);
    assert_eq!(resolve_locale(None, Some("ca-ES")).unwrap(), Locale::Ca);
    assert_eq!(resolve_locale(None, None).unwrap(), Locale::En);
}

#[test]
fn invalid_locale_environment_is_rejected() {
    let error = resolve_locale(None, Some("xx")).unwrap_err();
    assert!(error.to_string().contains("ONTOLOGY_GATE_LANG"));
}

#[test]
fn unknown_modifier_maps_to_localized_error() {
    let error: CliError = precedence_report("manual", None, "agent").unwrap_err().into();
    assert!(error.to_string().starts_with("Unknown modifier agent"));
}

#[test]
fn blocked_precedence_renders_conflict() {
    let report = precedence_report("inferred", Some("manual"), "mcp").unwrap();
    let rendered: Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
    assert_eq!(rendered["outcome"]["decision"], "deny");
    assert_eq!(rendered["outcome"]["existing"], "manual");
    assert_eq!(rendered["modifier"], "mcp");
}
