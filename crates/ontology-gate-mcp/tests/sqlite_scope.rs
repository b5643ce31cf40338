// crates/ontology-gate-mcp/tests/sqlite_scope.rs
// ============================================================================
// Module: SQLite Scope Tests
// Description: Tenant scopes and configuration sources over the SQLite store.
// Purpose: Validate the session pool cap, connection return, and stored tool groups.
// Dependencies: ontology-gate-mcp, ontology-gate-store-sqlite, tempfile, tokio
// ============================================================================

//! Tool routing against a real `SQLite` database.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::missing_docs_in_private_items,
    missing_docs,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::sync::Arc;

use common::RecordingAuditSink;
use ontology_gate_core::FeatureId;
use ontology_gate_core::ToolGroup;
use ontology_gate_core::ToolGroupSettings;
use ontology_gate_mcp::AccessAuditSink;
use ontology_gate_mcp::AccessGate;
use ontology_gate_mcp::AccessGateConfig;
use ontology_gate_mcp::DenialCode;
use ontology_gate_mcp::FeatureInstallationChecker;
use ontology_gate_mcp::ScopeError;
use ontology_gate_mcp::SqliteFeatureChecker;
use ontology_gate_mcp::SqliteTenantScopeProvider;
use ontology_gate_mcp::SqliteToolGroupSource;
use ontology_gate_mcp::TenantScopeProvider;
use ontology_gate_mcp::ToolError;
use ontology_gate_mcp::ToolGroupSource;
use ontology_gate_mcp::ToolRouter;
use ontology_gate_store_sqlite::SqliteMetadataStore;
use ontology_gate_store_sqlite::SqliteStoreConfig;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn open_store(dir: &TempDir) -> SqliteMetadataStore {
    SqliteMetadataStore::open(&SqliteStoreConfig::new(dir.path().join("ontology.db"))).unwrap()
}

fn open_store_with_pool(dir: &TempDir, max_connections: u32, timeout_ms: u64) -> SqliteMetadataStore {
    let mut config = SqliteStoreConfig::new(dir.path().join("ontology.db"));
    config.max_connections = max_connections;
    config.connection_timeout_ms = timeout_ms;
    SqliteMetadataStore::open(&config).unwrap()
}

fn sqlite_router(store: &SqliteMetadataStore) -> ToolRouter<SqliteTenantScopeProvider> {
    let provider = SqliteTenantScopeProvider::new(store.clone());
    ToolRouter::new(AccessGate::new(AccessGateConfig {
        scopes: Arc::new(provider),
        tool_groups: Arc::new(SqliteToolGroupSource::new(store.clone())),
        features: Some(Arc::new(SqliteFeatureChecker::new(store.clone()))),
        audit: Arc::new(RecordingAuditSink::default()) as Arc<dyn AccessAuditSink>,
    }))
}

// ============================================================================
// SECTION: Session Pool
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn session_limit_times_out_then_recovers_after_release() {
    let dir = TempDir::new().unwrap();
    let store = open_store_with_pool(&dir, 1, 50);
    let provider = SqliteTenantScopeProvider::new(store.clone());

    let first = provider.with_tenant(common::tenant()).await.unwrap();
    assert_eq!(first.tenant_id(), Some(common::tenant()));
    assert_eq!(store.idle_connections(), 0);

    let blocked = provider.with_tenant(common::tenant()).await.err().unwrap();
    assert!(matches!(blocked, ScopeError::Timeout(50)));

    first.release();
    assert_eq!(store.idle_connections(), 1);
    let second = provider.with_tenant(common::tenant()).await.unwrap();
    drop(second);
    assert_eq!(store.idle_connections(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn released_scopes_return_connections_to_the_pool() {
    let dir = TempDir::new().unwrap();
    let store = open_store_with_pool(&dir, 2, 1_000);
    let provider = SqliteTenantScopeProvider::new(store.clone());

    let scope = provider.with_tenant(common::tenant()).await.unwrap();
    let idle_while_open = store.idle_connections();
    scope.release();
    assert_eq!(store.idle_connections(), idle_while_open + 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn stored_sources_answer_while_every_session_is_held() {
    let dir = TempDir::new().unwrap();
    let store = open_store_with_pool(&dir, 1, 50);
    let provider = SqliteTenantScopeProvider::new(store.clone());
    let tenant = common::tenant();
    store.set_tool_group(&tenant, "agent_tools", ToolGroupSettings::enabled()).unwrap();
    store.install_feature(&tenant, FeatureId::AiAgents).unwrap();

    let held = provider.with_tenant(tenant).await.unwrap();
    let groups = SqliteToolGroupSource::new(store.clone());
    let features = SqliteFeatureChecker::new(store.clone());
    assert!(groups.tool_groups_state(tenant).await.unwrap().is_enabled(ToolGroup::AgentTools));
    assert!(features.is_installed(tenant, FeatureId::AiAgents).await.unwrap());
    assert!(!features.is_installed(tenant, FeatureId::AiDataLiaison).await.unwrap());
    held.release();
}

// ============================================================================
// SECTION: Stored Configuration
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn stored_tool_groups_gate_maintenance_writes() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let router = sqlite_router(&store);
    let ctx = common::user_ctx(&["admin"]);
    let payload = json!({ "table_name": "orders", "description": "Customer orders" });

    let denied = router.handle_tool_call(&ctx, "update_table", payload.clone()).await;
    assert!(matches!(
        denied,
        Err(ToolError::Denied(ref denial)) if denial.code == DenialCode::OperationNotEnabled
    ));

    let developer = ToolGroupSettings {
        enabled: true,
        add_query_tools: false,
        add_ontology_maintenance: true,
    };
    store.set_tool_group(&common::tenant(), ToolGroup::Developer.as_str(), developer).unwrap();
    let response = router.handle_tool_call(&ctx, "update_table", payload).await.unwrap();
    assert_eq!(response["created"], true);
    assert_eq!(response["record"]["header"]["source"], "mcp");

    let snapshot = router.handle_tool_call(&ctx, "get_ontology", json!({})).await.unwrap();
    assert_eq!(snapshot["tables"][0]["description"], "Customer orders");
}

#[tokio::test(flavor = "multi_thread")]
async fn agent_access_follows_feature_installation() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let router = sqlite_router(&store);
    let tenant = common::tenant();
    store.set_tool_group(&tenant, "agent_tools", ToolGroupSettings::enabled()).unwrap();

    let denied = router.handle_tool_call(&common::agent_ctx(), "health", json!({})).await;
    assert!(matches!(
        denied,
        Err(ToolError::Denied(ref denial)) if denial.code == DenialCode::FeatureNotInstalled
    ));

    store.install_feature(&tenant, FeatureId::AiAgents).unwrap();
    let health = router.handle_tool_call(&common::agent_ctx(), "health", json!({})).await.unwrap();
    assert_eq!(health["status"], "ok");

    assert!(store.uninstall_feature(&tenant, FeatureId::AiAgents).unwrap());
    let revoked = router.handle_tool_call(&common::agent_ctx(), "health", json!({})).await;
    assert!(revoked.is_err());
}
