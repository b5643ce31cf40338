// crates/ontology-gate-mcp/tests/common/mod.rs
// ============================================================================
// Module: MCP Test Fixtures
// Description: Claims, configuration sources, and recording audit sinks.
// Purpose: Build access gates and routers over the in-memory store.
// ============================================================================

#![allow(dead_code, reason = "Each suite uses a different subset of fixtures.")]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use ontology_gate_core::Claims;
use ontology_gate_core::FeatureId;
use ontology_gate_core::InMemoryMetadataStore;
use ontology_gate_core::TenantId;
use ontology_gate_core::ToolGroup;
use ontology_gate_core::ToolGroupSettings;
use ontology_gate_core::ToolGroupsState;
use ontology_gate_mcp::AccessAuditEvent;
use ontology_gate_mcp::AccessAuditSink;
use ontology_gate_mcp::AccessGate;
use ontology_gate_mcp::AccessGateConfig;
use ontology_gate_mcp::FaultAuditEvent;
use ontology_gate_mcp::FeatureInstallationChecker;
use ontology_gate_mcp::InMemoryTenantScopeProvider;
use ontology_gate_mcp::RequestContext;
use ontology_gate_mcp::SourceError;
use ontology_gate_mcp::ToolGroupSource;
use ontology_gate_mcp::ToolRouter;
use ontology_gate_mcp::WriteAuditEvent;
use serde_json::Value;

pub const TENANT: &str = "3b0f8a52-6c0e-4f8e-9a57-0c2f4d1b7e11";
pub const USER_SUBJECT: &str = "5a1e7c93-0b2d-4e6f-8a1c-3d5e7f9b1c2d";

pub fn tenant() -> TenantId {
    TenantId::parse(TENANT).unwrap()
}

pub fn user_ctx(roles: &[&str]) -> RequestContext {
    RequestContext::authenticated(Claims::new(USER_SUBJECT, TENANT, roles.iter().copied()))
        .with_request_id("req-1")
}

pub fn agent_ctx() -> RequestContext {
    RequestContext::authenticated(Claims::new("agent", TENANT, Vec::<String>::new()))
}

pub fn developer_with_maintenance() -> ToolGroupsState {
    ToolGroupsState::new().with_group(
        ToolGroup::Developer,
        ToolGroupSettings {
            enabled: true,
            add_query_tools: true,
            add_ontology_maintenance: true,
        },
    )
}

// ============================================================================
// SECTION: Sources
// ============================================================================

/// Same tool-group state for every tenant.
pub struct FixedToolGroups(pub ToolGroupsState);

#[async_trait]
impl ToolGroupSource for FixedToolGroups {
    async fn tool_groups_state(&self, _tenant_id: TenantId) -> Result<ToolGroupsState, SourceError> {
        Ok(self.0.clone())
    }
}

/// Tool-group source that always fails.
pub struct FailingToolGroups;

#[async_trait]
impl ToolGroupSource for FailingToolGroups {
    async fn tool_groups_state(&self, _tenant_id: TenantId) -> Result<ToolGroupsState, SourceError> {
        Err(SourceError("settings table unreachable".to_string()))
    }
}

/// Fixed set of installed features.
pub struct FixedFeatures(pub BTreeSet<FeatureId>);

#[async_trait]
impl FeatureInstallationChecker for FixedFeatures {
    async fn is_installed(&self, _tenant_id: TenantId, feature: FeatureId) -> Result<bool, SourceError> {
        Ok(self.0.contains(&feature))
    }
}

/// Feature checker that always fails.
pub struct FailingFeatures;

#[async_trait]
impl FeatureInstallationChecker for FailingFeatures {
    async fn is_installed(&self, _tenant_id: TenantId, _feature: FeatureId) -> Result<bool, SourceError> {
        Err(SourceError("feature service timeout".to_string()))
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps every event as JSON.
#[derive(Default)]
pub struct RecordingAuditSink {
    pub events: Mutex<Vec<Value>>,
}

impl RecordingAuditSink {
    pub fn events_named(&self, name: &str) -> Vec<Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event["event"] == name)
            .cloned()
            .collect()
    }

    fn push(&self, value: Value) {
        self.events.lock().unwrap().push(value);
    }
}

impl AccessAuditSink for RecordingAuditSink {
    fn record_access(&self, event: &AccessAuditEvent) {
        self.push(serde_json::to_value(event).unwrap());
    }

    fn record_write(&self, event: &WriteAuditEvent) {
        self.push(serde_json::to_value(event).unwrap());
    }

    fn record_fault(&self, event: &FaultAuditEvent) {
        self.push(serde_json::to_value(event).unwrap());
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Gate and router over an in-memory store with inspectable scope counters.
pub struct Harness {
    pub provider: InMemoryTenantScopeProvider,
    pub audit: Arc<RecordingAuditSink>,
    pub router: ToolRouter<InMemoryTenantScopeProvider>,
}

impl Harness {
    pub fn new(
        tool_groups: Arc<dyn ToolGroupSource>,
        features: Option<Arc<dyn FeatureInstallationChecker>>,
    ) -> Self {
        let provider = InMemoryTenantScopeProvider::new(InMemoryMetadataStore::new());
        let audit = Arc::new(RecordingAuditSink::default());
        let gate = AccessGate::new(AccessGateConfig {
            scopes: Arc::new(provider.clone()),
            tool_groups,
            features,
            audit: Arc::clone(&audit) as Arc<dyn AccessAuditSink>,
        });
        Self {
            provider,
            audit,
            router: ToolRouter::new(gate),
        }
    }

    pub fn gate(&self) -> &AccessGate<InMemoryTenantScopeProvider> {
        self.router.gate()
    }

    pub fn with_state(state: ToolGroupsState) -> Self {
        Self::new(Arc::new(FixedToolGroups(state)), None)
    }

    pub fn store(&self) -> InMemoryMetadataStore {
        self.provider.store().clone()
    }

    pub fn acquired(&self) -> usize {
        self.provider.counters().acquired()
    }

    pub fn released(&self) -> usize {
        self.provider.counters().released()
    }
}
