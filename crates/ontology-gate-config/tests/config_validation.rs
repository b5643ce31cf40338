// crates/ontology-gate-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Store, audit, tool-group, and feature validation rules.
// Purpose: Ensure invalid configuration fails closed.
// =============================================================================

//! Validation tests for ontology-gate-config.

#![allow(
    clippy::use_debug,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use ontology_gate_config::OntologyGateConfig;
use ontology_gate_config::StoreType;
use ontology_gate_config::config_toml_example;

mod common;

use common::TestResult;
use common::assert_rejected;

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = OntologyGateConfig::from_toml_str("").map_err(|err| err.to_string())?;
    if config.store.store_type != StoreType::Memory {
        return Err("default store should be memory".to_string());
    }
    if config.store.pool_size != 4 || config.store.acquire_timeout_ms != 5_000 {
        return Err("unexpected store defaults".to_string());
    }
    if !config.audit.enabled || config.audit.path.is_some() {
        return Err("audit should default to enabled on stderr".to_string());
    }
    if config.store.sqlite_config().is_some() {
        return Err("memory store has no sqlite config".to_string());
    }
    Ok(())
}

#[test]
fn canonical_example_validates() -> TestResult {
    let config =
        OntologyGateConfig::from_toml_str(&config_toml_example()).map_err(|err| err.to_string())?;
    let sqlite = config.store.sqlite_config().ok_or("example should use sqlite")?;
    if sqlite.max_connections != config.store.pool_size {
        return Err("session pool should follow pool_size".to_string());
    }
    if sqlite.connection_timeout_ms != config.store.acquire_timeout_ms {
        return Err("pool checkout wait should follow acquire_timeout_ms".to_string());
    }
    Ok(())
}

#[test]
fn sqlite_store_requires_path() -> TestResult {
    assert_rejected("[store]\ntype = \"sqlite\"\n", "sqlite store requires path")
}

#[test]
fn memory_store_rejects_path() -> TestResult {
    assert_rejected("[store]\npath = \"x.db\"\n", "memory store must not set path")
}

#[test]
fn pool_size_bounds_are_enforced() -> TestResult {
    assert_rejected("[store]\npool_size = 0\n", "pool_size")?;
    assert_rejected("[store]\npool_size = 65\n", "pool_size")
}

#[test]
fn acquire_timeout_must_be_positive_and_bounded() -> TestResult {
    assert_rejected("[store]\nacquire_timeout_ms = 0\n", "acquire_timeout_ms")?;
    assert_rejected("[store]\nacquire_timeout_ms = 60001\n", "acquire_timeout_ms")
}

#[test]
fn unknown_tool_group_is_rejected() -> TestResult {
    assert_rejected("[tool_groups.default.admin_console]\nenabled = true\n", "unknown tool group")
}

#[test]
fn sub_flags_outside_developer_are_rejected() -> TestResult {
    assert_rejected(
        "[tool_groups.default.agent_tools]\nenabled = true\nadd_query_tools = true\n",
        "apply only to the developer group",
    )
}

#[test]
fn unknown_settings_field_is_rejected() -> TestResult {
    assert_rejected("[tool_groups.default.developer]\nenable = true\n", "unknown field")
}

#[test]
fn tenant_keys_must_be_tenant_ids() -> TestResult {
    assert_rejected(
        "[tool_groups.tenants.\"acme\".developer]\nenabled = true\n",
        "invalid tenant id acme",
    )?;
    assert_rejected("[features]\nacme = [\"ai_agents\"]\n", "invalid tenant id acme")
}

#[test]
fn duplicate_tenant_spellings_are_rejected() -> TestResult {
    let upper = common::TENANT.to_uppercase();
    let toml = format!(
        "[tool_groups.tenants.\"{}\".developer]\nenabled = true\n\n[tool_groups.tenants.\"{upper}\".developer]\nenabled = false\n",
        common::TENANT
    );
    assert_rejected(&toml, "more than once")
}

#[test]
fn unknown_feature_is_rejected() -> TestResult {
    let toml = format!("[features]\n\"{}\" = [\"ai_everything\"]\n", common::TENANT);
    assert_rejected(&toml, "unknown feature ai_everything")
}
