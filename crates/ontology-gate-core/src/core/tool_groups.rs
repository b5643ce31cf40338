// crates/ontology-gate-core/src/core/tool_groups.rs
// ============================================================================
// Module: Tool Groups
// Description: Per-tenant tool-group toggle state and add-on feature ids.
// Purpose: Model the configuration the capability calculator reads.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Tenant administrators toggle groups of tools through a separate
//! configuration surface. The gate only reads that state. State is keyed by
//! group name so that groups this build does not know about are carried
//! through harmlessly and ignored.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Tool Groups
// ============================================================================

/// Known tool groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolGroup {
    /// Developer tools: schema/ontology reads, ad-hoc queries, maintenance.
    Developer,
    /// Pre-approved query tools for admin and data roles.
    ApprovedQueries,
    /// Tools exposed to agent credentials.
    AgentTools,
}

impl ToolGroup {
    /// Returns the canonical group name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Developer => "developer",
            Self::ApprovedQueries => "approved_queries",
            Self::AgentTools => "agent_tools",
        }
    }

    /// Parses a canonical group name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "developer" => Some(Self::Developer),
            "approved_queries" => Some(Self::ApprovedQueries),
            "agent_tools" => Some(Self::AgentTools),
            _ => None,
        }
    }
}

impl fmt::Display for ToolGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Toggle state for one tool group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolGroupSettings {
    /// Group-level enable flag.
    pub enabled: bool,
    /// Adds ad-hoc query tools (developer group only).
    pub add_query_tools: bool,
    /// Adds ontology-maintenance tools (developer group only).
    pub add_ontology_maintenance: bool,
}

impl ToolGroupSettings {
    /// Settings with only the group-level flag turned on.
    #[must_use]
    pub const fn enabled() -> Self {
        Self {
            enabled: true,
            add_query_tools: false,
            add_ontology_maintenance: false,
        }
    }
}

/// Tool-group state for one tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolGroupsState {
    /// Settings keyed by group name.
    groups: BTreeMap<String, ToolGroupSettings>,
}

impl ToolGroupsState {
    /// Creates an empty state (every group disabled).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with the group's settings replaced.
    #[must_use]
    pub fn with_group(mut self, group: ToolGroup, settings: ToolGroupSettings) -> Self {
        self.set(group.as_str(), settings);
        self
    }

    /// Replaces settings for a group name.
    pub fn set(&mut self, group: impl Into<String>, settings: ToolGroupSettings) {
        self.groups.insert(group.into(), settings);
    }

    /// Returns settings for a known group.
    #[must_use]
    pub fn settings(&self, group: ToolGroup) -> Option<&ToolGroupSettings> {
        self.groups.get(group.as_str())
    }

    /// Returns true when the group is present and enabled.
    #[must_use]
    pub fn is_enabled(&self, group: ToolGroup) -> bool {
        self.settings(group).is_some_and(|settings| settings.enabled)
    }

    /// Iterates raw group names and settings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ToolGroupSettings)> {
        self.groups.iter().map(|(name, settings)| (name.as_str(), settings))
    }
}

// ============================================================================
// SECTION: Feature Ids
// ============================================================================

/// Per-tenant add-on features that gate specific operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureId {
    /// Agent credential access.
    AiAgents,
    /// Approved-query access for business users.
    AiDataLiaison,
}

impl FeatureId {
    /// Returns the canonical feature name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AiAgents => "ai_agents",
            Self::AiDataLiaison => "ai_data_liaison",
        }
    }

    /// Parses a canonical feature name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ai_agents" => Some(Self::AiAgents),
            "ai_data_liaison" => Some(Self::AiDataLiaison),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
