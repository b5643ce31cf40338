// crates/ontology-gate-mcp/tests/config_router.rs
// ============================================================================
// Module: Config-Built Router Tests
// Description: Routers assembled from `ontology-gate.toml` text.
// Purpose: Validate store, audit, tool-group, and feature wiring from config.
// Dependencies: ontology-gate-mcp, ontology-gate-config, serde_json, tempfile, tokio
// ============================================================================

//! Tool router tests over gates built with `from_config`.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::missing_docs_in_private_items,
    missing_docs,
    reason = "Test-only assertions and helpers are permitted."
)]

use ontology_gate_config::OntologyGateConfig;
use ontology_gate_core::Claims;
use ontology_gate_mcp::ConfiguredScopeProvider;
use ontology_gate_mcp::DenialCode;
use ontology_gate_mcp::GateBuildError;
use ontology_gate_mcp::RequestContext;
use ontology_gate_mcp::ToolError;
use ontology_gate_mcp::ToolRouter;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const TENANT: &str = "3b0f8a52-6c0e-4f8e-9a57-0c2f4d1b7e11";
const OTHER_TENANT: &str = "9d4c2b1a-7e6f-4a5b-8c9d-0e1f2a3b4c5d";
const USER: &str = "5a1e7c93-0b2d-4e6f-8a1c-3d5e7f9b1c2d";

const GROUPS_AND_FEATURES: &str = r#"
[tool_groups.default.agent_tools]
enabled = true

[tool_groups.tenants."3b0f8a52-6c0e-4f8e-9a57-0c2f4d1b7e11".developer]
enabled = true
add_ontology_maintenance = true

[tool_groups.tenants."3b0f8a52-6c0e-4f8e-9a57-0c2f4d1b7e11".agent_tools]
enabled = true

[features]
"3b0f8a52-6c0e-4f8e-9a57-0c2f4d1b7e11" = ["ai_agents"]
"#;

fn admin(tenant: &str) -> RequestContext {
    RequestContext::authenticated(Claims::new(USER, tenant, ["admin"]))
}

fn agent(tenant: &str) -> RequestContext {
    RequestContext::authenticated(Claims::new("agent", tenant, Vec::<String>::new()))
}

fn memory_config() -> OntologyGateConfig {
    let text = format!("[audit]\nenabled = false\n{GROUPS_AND_FEATURES}");
    OntologyGateConfig::from_toml_str(&text).unwrap()
}

fn sqlite_config(dir: &TempDir) -> OntologyGateConfig {
    let text = format!(
        "[store]\ntype = \"sqlite\"\npath = '{}'\npool_size = 1\nacquire_timeout_ms = \
         250\n\n[audit]\npath = '{}'\n{GROUPS_AND_FEATURES}",
        dir.path().join("ontology.db").display(),
        dir.path().join("audit.jsonl").display(),
    );
    OntologyGateConfig::from_toml_str(&text).unwrap()
}

fn code_of(result: Result<serde_json::Value, ToolError>) -> DenialCode {
    match result {
        Err(ToolError::Denied(denial)) => denial.code,
        other => panic!("expected denial, got {other:?}"),
    }
}

// ============================================================================
// SECTION: Memory Store
// ============================================================================

#[tokio::test]
async fn tenant_groups_from_config_drive_maintenance_tools() {
    let router = ToolRouter::from_config(&memory_config()).unwrap();
    assert!(matches!(**router.gate().scopes(), ConfiguredScopeProvider::Memory(_)));

    let created = router
        .handle_tool_call(
            &admin(TENANT),
            "update_table",
            json!({ "table_name": "orders", "description": "Customer purchase orders" }),
        )
        .await
        .unwrap();
    assert_eq!(created["created"], true);
    assert_eq!(created["record"]["header"]["source"], "mcp");

    let other = router
        .handle_tool_call(
            &admin(OTHER_TENANT),
            "update_table",
            json!({ "table_name": "orders", "description": "not enabled here" }),
        )
        .await;
    assert_eq!(code_of(other), DenialCode::OperationNotEnabled);
}

#[tokio::test]
async fn agent_access_follows_configured_features() {
    let router = ToolRouter::from_config(&memory_config()).unwrap();

    let installed = router.handle_tool_call(&agent(TENANT), "get_context", json!({})).await;
    assert!(matches!(installed, Err(ToolError::Unsupported(_))), "{installed:?}");

    let missing = router.handle_tool_call(&agent(OTHER_TENANT), "get_context", json!({})).await;
    assert_eq!(code_of(missing), DenialCode::FeatureNotInstalled);

    let health = router.handle_tool_call(&agent(OTHER_TENANT), "health", json!({})).await.unwrap();
    assert_eq!(health["status"], "ok");
}

#[test]
fn invalid_store_limits_fail_before_opening_anything() {
    let mut config = memory_config();
    config.store.pool_size = 0;
    let Err(error) = ToolRouter::from_config(&config) else {
        panic!("expected config error");
    };
    assert!(matches!(error, GateBuildError::Config(ref message) if message.contains("pool_size")));
}

// ============================================================================
// SECTION: SQLite Store
// ============================================================================

#[tokio::test]
async fn sqlite_config_persists_writes_and_audits_to_file() {
    let dir = TempDir::new().unwrap();
    let config = sqlite_config(&dir);

    let router = ToolRouter::from_config(&config).unwrap();
    assert!(matches!(**router.gate().scopes(), ConfiguredScopeProvider::Sqlite(_)));
    router
        .handle_tool_call(
            &admin(TENANT),
            "update_glossary_term",
            json!({ "term": "Active Customer", "definition": "Ordered in the last 90 days" }),
        )
        .await
        .unwrap();
    drop(router);

    let reopened = ToolRouter::from_config(&config).unwrap();
    let snapshot =
        reopened.handle_tool_call(&admin(TENANT), "get_ontology", json!({})).await.unwrap();
    assert_eq!(snapshot["glossary_terms"][0]["definition"], "Ordered in the last 90 days");

    let audit = std::fs::read_to_string(dir.path().join("audit.jsonl")).unwrap();
    assert!(audit.contains("metadata_write"));
}

#[test]
fn sqlite_store_path_that_cannot_open_is_an_init_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();
    let text = format!(
        "[store]\ntype = \"sqlite\"\npath = '{}'\n",
        blocker.join("ontology.db").display()
    );
    let config = OntologyGateConfig::from_toml_str(&text).unwrap();
    let Err(error) = ToolRouter::from_config(&config) else {
        panic!("expected init error");
    };
    assert!(matches!(error, GateBuildError::Init(_)), "{error:?}");
}
