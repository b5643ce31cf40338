// crates/ontology-gate-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for Ontology Gate configuration. The example is kept
//! valid by the config test suite.

/// Returns a canonical example `ontology-gate.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[store]
type = "sqlite"
path = "ontology-gate.db"
pool_size = 4
busy_timeout_ms = 5000
journal_mode = "wal"
sync_mode = "full"
acquire_timeout_ms = 5000

[audit]
enabled = true
path = "ontology-gate-audit.jsonl"

[tool_groups.default.developer]
enabled = true
add_query_tools = true
add_ontology_maintenance = false

[tool_groups.default.approved_queries]
enabled = true

[tool_groups.tenants."3b0f8a52-6c0e-4f8e-9a57-0c2f4d1b7e11".developer]
enabled = true
add_query_tools = true
add_ontology_maintenance = true

[tool_groups.tenants."3b0f8a52-6c0e-4f8e-9a57-0c2f4d1b7e11".agent_tools]
enabled = true

[features]
"3b0f8a52-6c0e-4f8e-9a57-0c2f4d1b7e11" = ["ai_agents", "ai_data_liaison"]
"#,
    )
}
