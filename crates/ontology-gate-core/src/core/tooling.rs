// crates/ontology-gate-core/src/core/tooling.rs
// ============================================================================
// Module: Tooling Identifiers
// Description: Canonical operation names for the Ontology Gate tool surface.
// Purpose: Shared tool naming across capability, gate, router, and config.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Canonical tool identifiers. These names are part of the external contract
//! surface and are the values checked against a caller's capability set.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Canonical tool names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    /// Server health and tenant connectivity status.
    Health,
    /// Echo the request payload back to the caller.
    Echo,
    /// Describe the tenant's relational schema.
    GetSchema,
    /// Return the tenant's semantic metadata.
    GetOntology,
    /// Return schema plus metadata context for question answering.
    GetContext,
    /// Execute an ad-hoc read-only query.
    Query,
    /// Sample rows from a table.
    Sample,
    /// Validate query syntax without executing it.
    Validate,
    /// Explain a query plan.
    ExplainQuery,
    /// List pre-approved queries.
    ListApprovedQueries,
    /// Execute a pre-approved query.
    ExecuteApprovedQuery,
    /// Create or update table metadata.
    UpdateTable,
    /// Delete table metadata.
    DeleteTableMetadata,
    /// Create or update column metadata.
    UpdateColumn,
    /// Delete column metadata.
    DeleteColumnMetadata,
    /// Create or update an entity relationship.
    UpdateRelationship,
    /// Delete an entity relationship.
    DeleteRelationship,
    /// Create or update a glossary term.
    UpdateGlossaryTerm,
    /// Delete a glossary term.
    DeleteGlossaryTerm,
    /// Create or update a project knowledge fact.
    UpdateProjectKnowledge,
    /// Delete a project knowledge fact.
    DeleteProjectKnowledge,
}

impl ToolName {
    /// Returns the canonical string name for the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Echo => "echo",
            Self::GetSchema => "get_schema",
            Self::GetOntology => "get_ontology",
            Self::GetContext => "get_context",
            Self::Query => "query",
            Self::Sample => "sample",
            Self::Validate => "validate",
            Self::ExplainQuery => "explain_query",
            Self::ListApprovedQueries => "list_approved_queries",
            Self::ExecuteApprovedQuery => "execute_approved_query",
            Self::UpdateTable => "update_table",
            Self::DeleteTableMetadata => "delete_table_metadata",
            Self::UpdateColumn => "update_column",
            Self::DeleteColumnMetadata => "delete_column_metadata",
            Self::UpdateRelationship => "update_relationship",
            Self::DeleteRelationship => "delete_relationship",
            Self::UpdateGlossaryTerm => "update_glossary_term",
            Self::DeleteGlossaryTerm => "delete_glossary_term",
            Self::UpdateProjectKnowledge => "update_project_knowledge",
            Self::DeleteProjectKnowledge => "delete_project_knowledge",
        }
    }

    /// Returns all tool names in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Health,
            Self::Echo,
            Self::GetSchema,
            Self::GetOntology,
            Self::GetContext,
            Self::Query,
            Self::Sample,
            Self::Validate,
            Self::ExplainQuery,
            Self::ListApprovedQueries,
            Self::ExecuteApprovedQuery,
            Self::UpdateTable,
            Self::DeleteTableMetadata,
            Self::UpdateColumn,
            Self::DeleteColumnMetadata,
            Self::UpdateRelationship,
            Self::DeleteRelationship,
            Self::UpdateGlossaryTerm,
            Self::DeleteGlossaryTerm,
            Self::UpdateProjectKnowledge,
            Self::DeleteProjectKnowledge,
        ]
    }

    /// Parses a tool name from its string representation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|tool| tool.as_str() == name)
    }

    /// Returns true when the tool mutates metadata records.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(
            self,
            Self::UpdateTable
                | Self::DeleteTableMetadata
                | Self::UpdateColumn
                | Self::DeleteColumnMetadata
                | Self::UpdateRelationship
                | Self::DeleteRelationship
                | Self::UpdateGlossaryTerm
                | Self::DeleteGlossaryTerm
                | Self::UpdateProjectKnowledge
                | Self::DeleteProjectKnowledge
        )
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ToolName;

    #[test]
    fn every_tool_parses_from_its_name() {
        for tool in ToolName::all() {
            assert_eq!(ToolName::parse(tool.as_str()), Some(*tool));
        }
        assert_eq!(ToolName::parse("drop_everything"), None);
    }
}
