// crates/ontology-gate-core/src/runtime/capabilities.rs
// ============================================================================
// Module: Tool Capability Calculator
// Description: Maps caller claims and tool-group state to permitted tools.
// Purpose: Single source of truth for which operations a caller may invoke.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Capability sets are derived per request and never cached. The
//! calculation has no error path: missing configuration yields the minimal
//! set.
//!
//! ## Invariants
//! - Agent credentials ignore human role claims entirely.
//! - The `user` role always receives exactly [`LIMITED_TOOLS`], regardless
//!   of tool-group state.
//! - Every set contains [`ToolName::Health`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::claims::Claims;
use crate::core::claims::CredentialClass;
use crate::core::role::Role;
use crate::core::tool_groups::FeatureId;
use crate::core::tool_groups::ToolGroup;
use crate::core::tool_groups::ToolGroupsState;
use crate::core::tooling::ToolName;

// ============================================================================
// SECTION: Tool Tables
// ============================================================================

/// Fixed set for callers whose effective role is `user`.
pub const LIMITED_TOOLS: &[ToolName] =
    &[ToolName::Health, ToolName::ListApprovedQueries, ToolName::ExecuteApprovedQuery];

/// Set for agent credentials when the `agent_tools` group is enabled.
pub const AGENT_TOOLS: &[ToolName] = &[
    ToolName::Health,
    ToolName::ListApprovedQueries,
    ToolName::ExecuteApprovedQuery,
    ToolName::GetContext,
];

/// Developer group base tools.
const DEVELOPER_TOOLS: &[ToolName] =
    &[ToolName::Echo, ToolName::GetSchema, ToolName::GetOntology, ToolName::GetContext];

/// Developer `add_query_tools` sub-flag tools.
const QUERY_TOOLS: &[ToolName] =
    &[ToolName::Query, ToolName::Sample, ToolName::Validate, ToolName::ExplainQuery];

/// Developer `add_ontology_maintenance` sub-flag tools.
const MAINTENANCE_TOOLS: &[ToolName] = &[
    ToolName::UpdateTable,
    ToolName::DeleteTableMetadata,
    ToolName::UpdateColumn,
    ToolName::DeleteColumnMetadata,
    ToolName::UpdateRelationship,
    ToolName::DeleteRelationship,
    ToolName::UpdateGlossaryTerm,
    ToolName::DeleteGlossaryTerm,
    ToolName::UpdateProjectKnowledge,
    ToolName::DeleteProjectKnowledge,
];

/// Approved-query group tools.
const APPROVED_QUERY_TOOLS: &[ToolName] =
    &[ToolName::ListApprovedQueries, ToolName::ExecuteApprovedQuery];

// ============================================================================
// SECTION: Capability Set
// ============================================================================

/// Set of tools a caller may invoke for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<ToolName>);

impl CapabilitySet {
    /// Builds a set from tool names.
    #[must_use]
    pub fn from_tools(tools: &[ToolName]) -> Self {
        Self(tools.iter().copied().collect())
    }

    /// Returns true when the tool is permitted.
    #[must_use]
    pub fn contains(&self, tool: ToolName) -> bool {
        self.0.contains(&tool)
    }

    /// Iterates permitted tools in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = ToolName> + '_ {
        self.0.iter().copied()
    }

    /// Returns the number of permitted tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no tools are permitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds every tool in the slice.
    fn extend(&mut self, tools: &[ToolName]) {
        self.0.extend(tools.iter().copied());
    }
}

// ============================================================================
// SECTION: Calculation
// ============================================================================

/// Computes the capability set for a caller.
#[must_use]
pub fn capabilities(claims: &Claims, state: &ToolGroupsState) -> CapabilitySet {
    if claims.credential_class() == CredentialClass::Agent {
        return agent_capabilities(state);
    }
    match claims.effective_role() {
        Role::User => CapabilitySet::from_tools(LIMITED_TOOLS),
        Role::Data | Role::Admin => group_capabilities(state),
    }
}

/// Agent set governed by the `agent_tools` group.
fn agent_capabilities(state: &ToolGroupsState) -> CapabilitySet {
    if state.is_enabled(ToolGroup::AgentTools) {
        CapabilitySet::from_tools(AGENT_TOOLS)
    } else {
        CapabilitySet::from_tools(&[ToolName::Health])
    }
}

/// Admin/data set assembled from enabled groups.
fn group_capabilities(state: &ToolGroupsState) -> CapabilitySet {
    let mut set = CapabilitySet::from_tools(&[ToolName::Health]);
    if let Some(developer) = state.settings(ToolGroup::Developer)
        && developer.enabled
    {
        set.extend(DEVELOPER_TOOLS);
        if developer.add_query_tools {
            set.extend(QUERY_TOOLS);
        }
        if developer.add_ontology_maintenance {
            set.extend(MAINTENANCE_TOOLS);
        }
    }
    if state.is_enabled(ToolGroup::ApprovedQueries) {
        set.extend(APPROVED_QUERY_TOOLS);
    }
    set
}

/// Returns the add-on feature an operation requires for a credential class.
#[must_use]
pub const fn required_feature(tool: ToolName, class: CredentialClass) -> Option<FeatureId> {
    match class {
        CredentialClass::Agent => Some(FeatureId::AiAgents),
        CredentialClass::User => match tool {
            ToolName::ListApprovedQueries | ToolName::ExecuteApprovedQuery => {
                Some(FeatureId::AiDataLiaison)
            }
            _ => None,
        },
    }
}
