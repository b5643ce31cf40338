// crates/ontology-gate-core/src/core/mod.rs
// ============================================================================
// Module: Ontology Gate Core Types
// Description: Identity, role, provenance, tool, and record model types.
// Purpose: Group the data model shared by every Ontology Gate crate.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! Core types are plain data with deterministic behavior. Anything that
//! decides access or precedence lives in [`crate::runtime`].

pub mod claims;
pub mod identifiers;
pub mod provenance;
pub mod records;
pub mod role;
pub mod time;
pub mod tool_groups;
pub mod tooling;

pub use claims::AGENT_SUBJECT;
pub use claims::Claims;
pub use claims::ClaimsError;
pub use claims::CredentialClass;
pub use identifiers::ActorId;
pub use identifiers::TenantId;
pub use identifiers::TenantIdError;
pub use provenance::Provenance;
pub use provenance::SourceLabel;
pub use records::ColumnKey;
pub use records::ColumnMetadata;
pub use records::ColumnPatch;
pub use records::EntityRelationship;
pub use records::FactKey;
pub use records::GlossaryTerm;
pub use records::GlossaryTermPatch;
pub use records::KnowledgeFact;
pub use records::KnowledgeFactPatch;
pub use records::MetadataRecord;
pub use records::RecordHeader;
pub use records::RecordKind;
pub use records::RelationshipKey;
pub use records::RelationshipPatch;
pub use records::TableKey;
pub use records::TableMetadata;
pub use records::TablePatch;
pub use records::TermKey;
pub use role::Role;
pub use time::Timestamp;
pub use tool_groups::FeatureId;
pub use tool_groups::ToolGroup;
pub use tool_groups::ToolGroupSettings;
pub use tool_groups::ToolGroupsState;
pub use tooling::ToolName;
