// crates/ontology-gate-core/tests/capabilities.rs
// ============================================================================
// Module: Capability Calculator Tests
// Description: Role, credential, and tool-group driven capability sets.
// Purpose: Pin which operations each caller class can reach.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

mod common;

use ontology_gate_core::CredentialClass;
use ontology_gate_core::FeatureId;
use ontology_gate_core::ToolGroup;
use ontology_gate_core::ToolGroupSettings;
use ontology_gate_core::ToolGroupsState;
use ontology_gate_core::ToolName;
use ontology_gate_core::capabilities;
use ontology_gate_core::required_feature;

fn everything_enabled() -> ToolGroupsState {
    ToolGroupsState::new()
        .with_group(
            ToolGroup::Developer,
            ToolGroupSettings {
                enabled: true,
                add_query_tools: true,
                add_ontology_maintenance: true,
            },
        )
        .with_group(ToolGroup::ApprovedQueries, ToolGroupSettings::enabled())
        .with_group(ToolGroup::AgentTools, ToolGroupSettings::enabled())
}

fn names(set: &ontology_gate_core::CapabilitySet) -> Vec<&'static str> {
    set.iter().map(ToolName::as_str).collect()
}

#[test]
fn user_role_gets_limited_set_even_with_every_group_enabled() {
    let set = capabilities(&common::user_claims(&["user"]), &everything_enabled());
    assert_eq!(names(&set), vec!["health", "list_approved_queries", "execute_approved_query"]);
    assert!(!set.contains(ToolName::Query));
    assert!(!set.contains(ToolName::UpdateTable));
}

#[test]
fn missing_or_unknown_roles_resolve_to_user() {
    let state = everything_enabled();
    let empty = capabilities(&common::user_claims(&[]), &state);
    let unknown = capabilities(&common::user_claims(&["superuser"]), &state);
    assert_eq!(empty, unknown);
    assert_eq!(empty.len(), 3);
}

#[test]
fn data_role_with_developer_query_tools_can_query() {
    let state = ToolGroupsState::new().with_group(
        ToolGroup::Developer,
        ToolGroupSettings {
            enabled: true,
            add_query_tools: true,
            add_ontology_maintenance: false,
        },
    );
    let set = capabilities(&common::user_claims(&["user", "data"]), &state);
    assert!(set.contains(ToolName::Query));
    assert!(set.contains(ToolName::GetSchema));
    assert!(!set.contains(ToolName::UpdateColumn));
    assert!(!set.contains(ToolName::ListApprovedQueries));
}

#[test]
fn query_sub_flag_is_inert_without_developer_enabled() {
    let state = ToolGroupsState::new().with_group(
        ToolGroup::Developer,
        ToolGroupSettings {
            enabled: false,
            add_query_tools: true,
            add_ontology_maintenance: true,
        },
    );
    let set = capabilities(&common::user_claims(&["admin"]), &state);
    assert_eq!(names(&set), vec!["health"]);
}

#[test]
fn admin_without_configuration_gets_health_only() {
    let set = capabilities(&common::user_claims(&["admin"]), &ToolGroupsState::new());
    assert_eq!(names(&set), vec!["health"]);
}

#[test]
fn admin_with_maintenance_gets_every_write_tool() {
    let set = capabilities(&common::user_claims(&["admin"]), &everything_enabled());
    for tool in ToolName::all().iter().filter(|tool| tool.is_write()) {
        assert!(set.contains(*tool), "missing {tool}");
    }
}

#[test]
fn agent_credentials_ignore_role_claims() {
    let state = everything_enabled();
    let plain = capabilities(&common::agent_claims(&[]), &state);
    let with_admin = capabilities(&common::agent_claims(&["admin"]), &state);
    assert_eq!(plain, with_admin);
    assert_eq!(
        names(&plain),
        vec!["health", "get_context", "list_approved_queries", "execute_approved_query"]
    );
    assert!(!plain.contains(ToolName::Query));
}

#[test]
fn agent_without_agent_tools_gets_health_only() {
    let state = ToolGroupsState::new()
        .with_group(ToolGroup::Developer, ToolGroupSettings::enabled());
    let set = capabilities(&common::agent_claims(&["admin"]), &state);
    assert_eq!(names(&set), vec!["health"]);
}

#[test]
fn unknown_group_names_are_ignored() {
    let mut state = ToolGroupsState::new();
    state.set("experimental", ToolGroupSettings::enabled());
    let set = capabilities(&common::user_claims(&["admin"]), &state);
    assert_eq!(names(&set), vec!["health"]);
}

#[test]
fn feature_requirements_follow_credential_class() {
    assert_eq!(required_feature(ToolName::Health, CredentialClass::Agent), Some(FeatureId::AiAgents));
    assert_eq!(
        required_feature(ToolName::ExecuteApprovedQuery, CredentialClass::User),
        Some(FeatureId::AiDataLiaison)
    );
    assert_eq!(required_feature(ToolName::Query, CredentialClass::User), None);
    assert_eq!(required_feature(ToolName::Health, CredentialClass::User), None);
}
