// crates/ontology-gate-core/src/core/records.rs
// ============================================================================
// Module: Metadata Records
// Description: Semantic-metadata record types with provenance headers.
// Purpose: Give the write path one uniform record abstraction.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Five record kinds describe a tenant's relational schema: table metadata,
//! column metadata, entity relationships, glossary terms, and project
//! knowledge facts. Each record carries a [`RecordHeader`] with its
//! provenance labels and revision, a natural key, and an optional-field
//! payload. Updates arrive as patches where `None` means "leave unchanged".
//!
//! ## Invariants
//! - At most one live record per `(tenant, kind, natural key)`.
//! - `source` is written once on creation and never changed by an update.
//! - Natural keys are trimmed and non-empty.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::identifiers::ActorId;
use crate::core::identifiers::TenantId;
use crate::core::provenance::SourceLabel;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Record Kind
// ============================================================================

/// Kind of metadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Table-level description.
    Table,
    /// Column-level description.
    Column,
    /// Relationship between two entities.
    Relationship,
    /// Business glossary term.
    GlossaryTerm,
    /// Free-form project knowledge fact.
    KnowledgeFact,
}

impl RecordKind {
    /// Returns the canonical kind label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Column => "column",
            Self::Relationship => "relationship",
            Self::GlossaryTerm => "glossary_term",
            Self::KnowledgeFact => "knowledge_fact",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Header
// ============================================================================

/// Provenance, revision, and attribution shared by every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHeader {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Provenance of the creator.
    pub source: SourceLabel,
    /// Provenance of the most recent editor, if any.
    #[serde(default)]
    pub last_edit_source: Option<SourceLabel>,
    /// Row revision; starts at 1 and increments on each update.
    pub revision: u64,
    /// Actor that created the record.
    #[serde(default)]
    pub created_by: Option<ActorId>,
    /// Actor that last updated the record.
    #[serde(default)]
    pub updated_by: Option<ActorId>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Timestamp,
}

impl RecordHeader {
    /// Builds a header for a record that is about to be created.
    #[must_use]
    pub const fn new(
        tenant_id: TenantId,
        source: SourceLabel,
        actor: Option<ActorId>,
        now: Timestamp,
    ) -> Self {
        Self {
            tenant_id,
            source,
            last_edit_source: None,
            revision: 1,
            created_by: actor,
            updated_by: actor,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the provenance that governs the next modification.
    ///
    /// The last edit shadows the creator unless it is absent or blank.
    #[must_use]
    pub fn effective_source(&self) -> &SourceLabel {
        match &self.last_edit_source {
            Some(label) if !label.is_empty() => label,
            _ => &self.source,
        }
    }
}

// ============================================================================
// SECTION: Record Trait
// ============================================================================

/// Uniform view of a metadata record used by stores and the write path.
pub trait MetadataRecord: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + 'static {
    /// Natural key identifying a record within a tenant.
    type Key: Clone + Eq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Partial update; `None` fields leave the record unchanged.
    type Patch: Clone + fmt::Debug + Default + Send + 'static;

    /// Record kind.
    const KIND: RecordKind;

    /// Builds a new record from a patch.
    ///
    /// # Errors
    ///
    /// Returns a message when a field required on creation is missing.
    fn create(header: RecordHeader, key: Self::Key, patch: Self::Patch) -> Result<Self, String>;

    /// Returns the natural key.
    fn key(&self) -> &Self::Key;

    /// Returns the header.
    fn header(&self) -> &RecordHeader;

    /// Returns the header mutably.
    fn header_mut(&mut self) -> &mut RecordHeader;

    /// Merges the present fields of a patch into the record.
    ///
    /// # Errors
    ///
    /// Returns a message when the patch blanks a required field.
    fn apply(&mut self, patch: Self::Patch) -> Result<(), String>;

    /// Trims key components and rejects blank ones.
    ///
    /// # Errors
    ///
    /// Returns a message naming the blank key component.
    fn normalize_key(key: Self::Key) -> Result<Self::Key, String>;
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Trims a key component and rejects blank values.
fn normalize_component(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Overwrites `slot` when the patch carries a value.
fn merge<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Returns a required-on-create value or a message naming it.
fn required(field: &str, value: Option<String>) -> Result<String, String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(format!("{field} is required")),
    }
}

/// Replaces a required field when the patch carries it; blank values are rejected.
fn replace_required(field: &str, slot: &mut String, value: Option<String>) -> Result<(), String> {
    match value {
        None => Ok(()),
        Some(value) if value.trim().is_empty() => Err(format!("{field} must not be blank")),
        Some(value) => {
            *slot = value;
            Ok(())
        }
    }
}

// ============================================================================
// SECTION: Table Metadata
// ============================================================================

/// Natural key for table metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableKey {
    /// Table name.
    pub table_name: String,
}

impl TableKey {
    /// Builds a table key.
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
        }
    }
}

/// Partial update for table metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TablePatch {
    /// Business description.
    pub description: Option<String>,
    /// Usage guidance.
    pub usage_notes: Option<String>,
    /// Marks transient/staging tables.
    pub is_ephemeral: Option<bool>,
    /// Table to use instead of this one.
    pub preferred_alternative: Option<String>,
}

/// Semantic metadata attached to a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Provenance header.
    pub header: RecordHeader,
    /// Natural key.
    pub key: TableKey,
    /// Business description.
    pub description: Option<String>,
    /// Usage guidance.
    pub usage_notes: Option<String>,
    /// Marks transient/staging tables.
    pub is_ephemeral: Option<bool>,
    /// Table to use instead of this one.
    pub preferred_alternative: Option<String>,
}

impl MetadataRecord for TableMetadata {
    type Key = TableKey;
    type Patch = TablePatch;

    const KIND: RecordKind = RecordKind::Table;

    fn create(header: RecordHeader, key: TableKey, patch: TablePatch) -> Result<Self, String> {
        Ok(Self {
            header,
            key,
            description: patch.description,
            usage_notes: patch.usage_notes,
            is_ephemeral: patch.is_ephemeral,
            preferred_alternative: patch.preferred_alternative,
        })
    }

    fn key(&self) -> &TableKey {
        &self.key
    }

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }

    fn apply(&mut self, patch: TablePatch) -> Result<(), String> {
        merge(&mut self.description, patch.description);
        merge(&mut self.usage_notes, patch.usage_notes);
        merge(&mut self.is_ephemeral, patch.is_ephemeral);
        merge(&mut self.preferred_alternative, patch.preferred_alternative);
        Ok(())
    }

    fn normalize_key(key: TableKey) -> Result<TableKey, String> {
        Ok(TableKey {
            table_name: normalize_component("table_name", &key.table_name)?,
        })
    }
}

// ============================================================================
// SECTION: Column Metadata
// ============================================================================

/// Natural key for column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnKey {
    /// Owning table name.
    pub table_name: String,
    /// Column name.
    pub column_name: String,
}

impl ColumnKey {
    /// Builds a column key.
    #[must_use]
    pub fn new(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
        }
    }
}

/// Partial update for column metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnPatch {
    /// Business description.
    pub description: Option<String>,
    /// Semantic type such as `currency` or `email`.
    pub semantic_type: Option<String>,
    /// Analytical role such as `dimension` or `measure`.
    pub role: Option<String>,
    /// Known enumerated values.
    pub enum_values: Option<Vec<String>>,
    /// Marks columns holding sensitive data.
    pub is_sensitive: Option<bool>,
}

/// Semantic metadata attached to a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Provenance header.
    pub header: RecordHeader,
    /// Natural key.
    pub key: ColumnKey,
    /// Business description.
    pub description: Option<String>,
    /// Semantic type.
    pub semantic_type: Option<String>,
    /// Analytical role.
    pub role: Option<String>,
    /// Known enumerated values.
    pub enum_values: Option<Vec<String>>,
    /// Marks columns holding sensitive data.
    pub is_sensitive: Option<bool>,
}

impl MetadataRecord for ColumnMetadata {
    type Key = ColumnKey;
    type Patch = ColumnPatch;

    const KIND: RecordKind = RecordKind::Column;

    fn create(header: RecordHeader, key: ColumnKey, patch: ColumnPatch) -> Result<Self, String> {
        Ok(Self {
            header,
            key,
            description: patch.description,
            semantic_type: patch.semantic_type,
            role: patch.role,
            enum_values: patch.enum_values,
            is_sensitive: patch.is_sensitive,
        })
    }

    fn key(&self) -> &ColumnKey {
        &self.key
    }

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }

    fn apply(&mut self, patch: ColumnPatch) -> Result<(), String> {
        merge(&mut self.description, patch.description);
        merge(&mut self.semantic_type, patch.semantic_type);
        merge(&mut self.role, patch.role);
        merge(&mut self.enum_values, patch.enum_values);
        merge(&mut self.is_sensitive, patch.is_sensitive);
        Ok(())
    }

    fn normalize_key(key: ColumnKey) -> Result<ColumnKey, String> {
        Ok(ColumnKey {
            table_name: normalize_component("table_name", &key.table_name)?,
            column_name: normalize_component("column_name", &key.column_name)?,
        })
    }
}

// ============================================================================
// SECTION: Entity Relationships
// ============================================================================

/// Natural key for an entity relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipKey {
    /// Source entity.
    pub from_entity: String,
    /// Target entity.
    pub to_entity: String,
}

impl RelationshipKey {
    /// Builds a relationship key.
    #[must_use]
    pub fn new(from_entity: impl Into<String>, to_entity: impl Into<String>) -> Self {
        Self {
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
        }
    }
}

/// Partial update for an entity relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelationshipPatch {
    /// Business description.
    pub description: Option<String>,
    /// Short verb phrase, e.g. `places`.
    pub label: Option<String>,
    /// Cardinality such as `1:N`.
    pub cardinality: Option<String>,
    /// Join column on the source entity.
    pub from_column: Option<String>,
    /// Join column on the target entity.
    pub to_column: Option<String>,
}

/// A relationship between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRelationship {
    /// Provenance header.
    pub header: RecordHeader,
    /// Natural key.
    pub key: RelationshipKey,
    /// Business description.
    pub description: Option<String>,
    /// Short verb phrase.
    pub label: Option<String>,
    /// Cardinality.
    pub cardinality: Option<String>,
    /// Join column on the source entity.
    pub from_column: Option<String>,
    /// Join column on the target entity.
    pub to_column: Option<String>,
}

impl MetadataRecord for EntityRelationship {
    type Key = RelationshipKey;
    type Patch = RelationshipPatch;

    const KIND: RecordKind = RecordKind::Relationship;

    fn create(
        header: RecordHeader,
        key: RelationshipKey,
        patch: RelationshipPatch,
    ) -> Result<Self, String> {
        Ok(Self {
            header,
            key,
            description: patch.description,
            label: patch.label,
            cardinality: patch.cardinality,
            from_column: patch.from_column,
            to_column: patch.to_column,
        })
    }

    fn key(&self) -> &RelationshipKey {
        &self.key
    }

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }

    fn apply(&mut self, patch: RelationshipPatch) -> Result<(), String> {
        merge(&mut self.description, patch.description);
        merge(&mut self.label, patch.label);
        merge(&mut self.cardinality, patch.cardinality);
        merge(&mut self.from_column, patch.from_column);
        merge(&mut self.to_column, patch.to_column);
        Ok(())
    }

    fn normalize_key(key: RelationshipKey) -> Result<RelationshipKey, String> {
        Ok(RelationshipKey {
            from_entity: normalize_component("from_entity", &key.from_entity)?,
            to_entity: normalize_component("to_entity", &key.to_entity)?,
        })
    }
}

// ============================================================================
// SECTION: Glossary Terms
// ============================================================================

/// Natural key for a glossary term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermKey {
    /// Business term.
    pub term: String,
}

impl TermKey {
    /// Builds a term key.
    #[must_use]
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
        }
    }
}

/// Partial update for a glossary term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlossaryTermPatch {
    /// Plain-language definition. Required on creation.
    pub definition: Option<String>,
    /// SQL fragment that computes the term.
    pub defining_sql: Option<String>,
    /// Alternate names.
    pub aliases: Option<Vec<String>>,
    /// Table the SQL is rooted at.
    pub base_table: Option<String>,
}

/// A business glossary term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    /// Provenance header.
    pub header: RecordHeader,
    /// Natural key.
    pub key: TermKey,
    /// Plain-language definition.
    pub definition: String,
    /// SQL fragment that computes the term.
    pub defining_sql: Option<String>,
    /// Alternate names.
    pub aliases: Option<Vec<String>>,
    /// Table the SQL is rooted at.
    pub base_table: Option<String>,
}

impl MetadataRecord for GlossaryTerm {
    type Key = TermKey;
    type Patch = GlossaryTermPatch;

    const KIND: RecordKind = RecordKind::GlossaryTerm;

    fn create(header: RecordHeader, key: TermKey, patch: GlossaryTermPatch) -> Result<Self, String> {
        Ok(Self {
            header,
            key,
            definition: required("definition", patch.definition)?,
            defining_sql: patch.defining_sql,
            aliases: patch.aliases,
            base_table: patch.base_table,
        })
    }

    fn key(&self) -> &TermKey {
        &self.key
    }

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }

    fn apply(&mut self, patch: GlossaryTermPatch) -> Result<(), String> {
        replace_required("definition", &mut self.definition, patch.definition)?;
        merge(&mut self.defining_sql, patch.defining_sql);
        merge(&mut self.aliases, patch.aliases);
        merge(&mut self.base_table, patch.base_table);
        Ok(())
    }

    fn normalize_key(key: TermKey) -> Result<TermKey, String> {
        Ok(TermKey {
            term: normalize_component("term", &key.term)?,
        })
    }
}

// ============================================================================
// SECTION: Knowledge Facts
// ============================================================================

/// Natural key for a project knowledge fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactKey {
    /// Topic the fact is filed under.
    pub topic: String,
}

impl FactKey {
    /// Builds a fact key.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }
}

/// Partial update for a knowledge fact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KnowledgeFactPatch {
    /// The fact itself. Required on creation.
    pub fact: Option<String>,
    /// Background or rationale.
    pub context: Option<String>,
    /// Category such as `business_rule` or `terminology`.
    pub category: Option<String>,
}

/// Free-form knowledge about the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeFact {
    /// Provenance header.
    pub header: RecordHeader,
    /// Natural key.
    pub key: FactKey,
    /// The fact itself.
    pub fact: String,
    /// Background or rationale.
    pub context: Option<String>,
    /// Category.
    pub category: Option<String>,
}

impl MetadataRecord for KnowledgeFact {
    type Key = FactKey;
    type Patch = KnowledgeFactPatch;

    const KIND: RecordKind = RecordKind::KnowledgeFact;

    fn create(header: RecordHeader, key: FactKey, patch: KnowledgeFactPatch) -> Result<Self, String> {
        Ok(Self {
            header,
            key,
            fact: required("fact", patch.fact)?,
            context: patch.context,
            category: patch.category,
        })
    }

    fn key(&self) -> &FactKey {
        &self.key
    }

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }

    fn apply(&mut self, patch: KnowledgeFactPatch) -> Result<(), String> {
        replace_required("fact", &mut self.fact, patch.fact)?;
        merge(&mut self.context, patch.context);
        merge(&mut self.category, patch.category);
        Ok(())
    }

    fn normalize_key(key: FactKey) -> Result<FactKey, String> {
        Ok(FactKey {
            topic: normalize_component("topic", &key.topic)?,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

    use super::*;

    fn header(source: &str, last_edit: Option<&str>) -> RecordHeader {
        let tenant = TenantId::parse("7f1d2c3e-0000-4000-8000-000000000001").unwrap();
        let mut header =
            RecordHeader::new(tenant, SourceLabel::new(source), None, Timestamp::from_unix_millis(1));
        header.last_edit_source = last_edit.map(SourceLabel::new);
        header
    }

    #[test]
    fn effective_source_prefers_non_blank_last_edit() {
        assert_eq!(header("inferred", Some("manual")).effective_source().as_str(), "manual");
        assert_eq!(header("inferred", Some("  ")).effective_source().as_str(), "inferred");
        assert_eq!(header("mcp", None).effective_source().as_str(), "mcp");
    }

    #[test]
    fn glossary_term_requires_definition_on_create() {
        let result = GlossaryTerm::create(
            header("mcp", None),
            TermKey::new("ARR"),
            GlossaryTermPatch::default(),
        );
        assert_eq!(result.unwrap_err(), "definition is required");
    }

    #[test]
    fn blank_required_fields_are_rejected_on_update() {
        let mut term = GlossaryTerm::create(
            header("mcp", None),
            TermKey::new("ARR"),
            GlossaryTermPatch {
                definition: Some("Annual recurring revenue".to_string()),
                ..GlossaryTermPatch::default()
            },
        )
        .unwrap();
        let blank = GlossaryTermPatch {
            definition: Some("   ".to_string()),
            ..GlossaryTermPatch::default()
        };
        assert_eq!(term.apply(blank).unwrap_err(), "definition must not be blank");
        assert_eq!(term.definition, "Annual recurring revenue");
        term.apply(GlossaryTermPatch::default()).unwrap();
        assert_eq!(term.definition, "Annual recurring revenue");

        let mut fact = KnowledgeFact::create(
            header("mcp", None),
            FactKey::new("fiscal_year"),
            KnowledgeFactPatch {
                fact: Some("Starts in February".to_string()),
                ..KnowledgeFactPatch::default()
            },
        )
        .unwrap();
        let blank = KnowledgeFactPatch {
            fact: Some(String::new()),
            ..KnowledgeFactPatch::default()
        };
        assert_eq!(fact.apply(blank).unwrap_err(), "fact must not be blank");
    }

    #[test]
    fn normalize_key_trims_and_rejects_blank_components() {
        let key = ColumnMetadata::normalize_key(ColumnKey::new(" orders ", "total ")).unwrap();
        assert_eq!(key, ColumnKey::new("orders", "total"));
        let err = ColumnMetadata::normalize_key(ColumnKey::new("orders", "  ")).unwrap_err();
        assert_eq!(err, "column_name must not be empty");
    }
}
