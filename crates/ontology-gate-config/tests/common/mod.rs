// crates/ontology-gate-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for ontology-gate-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use ontology_gate_config::ConfigError;
use ontology_gate_config::OntologyGateConfig;

pub type TestResult = Result<(), String>;

pub const TENANT: &str = "3b0f8a52-6c0e-4f8e-9a57-0c2f4d1b7e11";
pub const OTHER_TENANT: &str = "9d6c1e27-2a4b-4b7d-8f0e-5e3a6c9d2b44";

/// Parses a TOML string without validation.
pub fn config_from_toml(toml_str: &str) -> Result<OntologyGateConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Asserts that parsing and validating the TOML fails with a message
/// containing `needle`.
pub fn assert_rejected(toml_str: &str, needle: &str) -> TestResult {
    match OntologyGateConfig::from_toml_str(toml_str) {
        Err(ConfigError::Invalid(message) | ConfigError::Parse(message)) => {
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Err(ConfigError::Io(message)) => Err(format!("unexpected io error: {message}")),
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
