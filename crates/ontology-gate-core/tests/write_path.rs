// crates/ontology-gate-core/tests/write_path.rs
// ============================================================================
// Module: Metadata Write Path Tests
// Description: Upsert, precedence, merge, delete, and revision CAS behavior.
// Purpose: Ensure writes honor provenance precedence and never lose edits.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::unwrap_in_result,
    clippy::panic_in_result_fn,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

mod common;

use ontology_gate_core::ColumnKey;
use ontology_gate_core::ColumnMetadata;
use ontology_gate_core::ColumnPatch;
use ontology_gate_core::FactKey;
use ontology_gate_core::GlossaryTerm;
use ontology_gate_core::GlossaryTermPatch;
use ontology_gate_core::InMemoryMetadataStore;
use ontology_gate_core::KnowledgeFact;
use ontology_gate_core::KnowledgeFactPatch;
use ontology_gate_core::MAX_WRITE_ATTEMPTS;
use ontology_gate_core::MetadataRecord;
use ontology_gate_core::MetadataStore;
use ontology_gate_core::Provenance;
use ontology_gate_core::SourceLabel;
use ontology_gate_core::StoreError;
use ontology_gate_core::TableKey;
use ontology_gate_core::TableMetadata;
use ontology_gate_core::TablePatch;
use ontology_gate_core::TenantId;
use ontology_gate_core::TermKey;
use ontology_gate_core::WriteError;
use ontology_gate_core::delete_record;
use ontology_gate_core::upsert_record;

fn described(text: &str) -> ColumnPatch {
    ColumnPatch {
        description: Some(text.to_string()),
        ..ColumnPatch::default()
    }
}

fn seed_column(store: &InMemoryMetadataStore, source: &str, last_edit: Option<&str>) {
    let mut header = common::header(Provenance::Inferred);
    header.source = SourceLabel::new(source);
    header.last_edit_source = last_edit.map(SourceLabel::new);
    let record = ColumnMetadata::create(
        header,
        ColumnKey::new("orders", "status"),
        ColumnPatch {
            description: Some("seeded".to_string()),
            semantic_type: Some("enum".to_string()),
            ..ColumnPatch::default()
        },
    )
    .unwrap();
    store.seed(&record).unwrap();
}

fn read_column(store: &mut InMemoryMetadataStore) -> ColumnMetadata {
    MetadataStore::<ColumnMetadata>::get(store, &common::tenant(), &ColumnKey::new("orders", "status"))
        .unwrap()
        .unwrap()
}

#[test]
fn agent_cannot_overwrite_manual_column_description() {
    let mut store = InMemoryMetadataStore::new();
    seed_column(&store, "manual", None);

    let err = upsert_record::<ColumnMetadata, _>(
        &mut store,
        &common::scope_at(10),
        ColumnKey::new("orders", "status"),
        Provenance::Mcp,
        described("agent rewrite"),
    )
    .unwrap_err();

    let WriteError::PrecedenceBlocked(conflict) = err else {
        panic!("expected precedence block, got {err}");
    };
    assert_eq!(conflict.existing.as_str(), "manual");
    assert_eq!(conflict.modifier, Provenance::Mcp);
    assert_eq!(read_column(&mut store).description.as_deref(), Some("seeded"));
}

#[test]
fn agent_overwrites_inferred_and_keeps_source() {
    let mut store = InMemoryMetadataStore::new();
    seed_column(&store, "inferred", None);

    let outcome = upsert_record::<ColumnMetadata, _>(
        &mut store,
        &common::scope_at(10),
        ColumnKey::new("orders", "status"),
        Provenance::Mcp,
        described("order lifecycle state"),
    )
    .unwrap();

    assert!(!outcome.created);
    let stored = read_column(&mut store);
    assert_eq!(stored.header.source.as_str(), "inferred");
    assert_eq!(stored.header.last_edit_source.as_ref().map(SourceLabel::as_str), Some("mcp"));
    assert_eq!(stored.header.revision, 2);
    assert_eq!(stored.description.as_deref(), Some("order lifecycle state"));
}

#[test]
fn last_edit_source_shadows_creation_source() {
    let mut store = InMemoryMetadataStore::new();
    seed_column(&store, "inferred", Some("manual"));

    let err = upsert_record::<ColumnMetadata, _>(
        &mut store,
        &common::scope_at(10),
        ColumnKey::new("orders", "status"),
        Provenance::Mcp,
        described("agent rewrite"),
    )
    .unwrap_err();
    assert!(matches!(err, WriteError::PrecedenceBlocked(_)));
}

#[test]
fn omitted_patch_fields_are_preserved() {
    let mut store = InMemoryMetadataStore::new();
    seed_column(&store, "mcp", None);

    upsert_record::<ColumnMetadata, _>(
        &mut store,
        &common::scope_at(10),
        ColumnKey::new("orders", "status"),
        Provenance::Mcp,
        ColumnPatch {
            is_sensitive: Some(false),
            ..ColumnPatch::default()
        },
    )
    .unwrap();

    let stored = read_column(&mut store);
    assert_eq!(stored.description.as_deref(), Some("seeded"));
    assert_eq!(stored.semantic_type.as_deref(), Some("enum"));
    assert_eq!(stored.is_sensitive, Some(false));
}

#[test]
fn first_write_creates_with_modifier_as_source() {
    let mut store = InMemoryMetadataStore::new();
    let outcome = upsert_record::<TableMetadata, _>(
        &mut store,
        &common::scope_at(42),
        TableKey::new("  orders "),
        Provenance::Mcp,
        TablePatch {
            description: Some("Customer orders".to_string()),
            ..TablePatch::default()
        },
    )
    .unwrap();

    assert!(outcome.created);
    assert_eq!(outcome.record.key.table_name, "orders");
    assert_eq!(outcome.record.header.source.as_str(), "mcp");
    assert_eq!(outcome.record.header.last_edit_source, None);
    assert_eq!(outcome.record.header.revision, 1);
    assert_eq!(outcome.record.header.created_at.as_unix_millis(), 42);
}

#[test]
fn blank_keys_and_missing_required_fields_are_invalid_input() {
    let mut store = InMemoryMetadataStore::new();
    let blank = upsert_record::<TableMetadata, _>(
        &mut store,
        &common::scope_at(1),
        TableKey::new("   "),
        Provenance::Mcp,
        TablePatch::default(),
    )
    .unwrap_err();
    assert!(matches!(blank, WriteError::InvalidInput(_)));

    let missing = upsert_record::<GlossaryTerm, _>(
        &mut store,
        &common::scope_at(1),
        TermKey::new("Net Revenue"),
        Provenance::Mcp,
        GlossaryTermPatch::default(),
    )
    .unwrap_err();
    assert!(matches!(missing, WriteError::InvalidInput(message) if message.contains("definition")));
}

#[test]
fn delete_is_idempotent() {
    let mut store = InMemoryMetadataStore::new();
    upsert_record::<KnowledgeFact, _>(
        &mut store,
        &common::scope_at(1),
        FactKey::new("fiscal_year"),
        Provenance::Mcp,
        KnowledgeFactPatch {
            fact: Some("Fiscal year starts in February".to_string()),
            ..KnowledgeFactPatch::default()
        },
    )
    .unwrap();

    let delete = |store: &mut InMemoryMetadataStore, millis| {
        delete_record::<KnowledgeFact, _>(
            store,
            &common::scope_at(millis),
            FactKey::new("fiscal_year"),
            Provenance::Mcp,
        )
        .unwrap()
    };
    assert!(delete(&mut store, 2).deleted);
    assert!(!delete(&mut store, 3).deleted);
}

#[test]
fn agent_cannot_delete_manual_column() {
    let mut store = InMemoryMetadataStore::new();
    seed_column(&store, "manual", None);

    let err = delete_record::<ColumnMetadata, _>(
        &mut store,
        &common::scope_at(2),
        ColumnKey::new("orders", "status"),
        Provenance::Mcp,
    )
    .unwrap_err();
    let WriteError::PrecedenceBlocked(conflict) = err else {
        panic!("expected precedence block, got {err:?}");
    };
    assert_eq!(conflict.existing.as_str(), "manual");
    assert_eq!(conflict.modifier, Provenance::Mcp);
    assert_eq!(read_column(&mut store).description.as_deref(), Some("seeded"));
}

#[test]
fn delete_arbitrates_against_last_edit_source() {
    let mut store = InMemoryMetadataStore::new();
    seed_column(&store, "inferred", Some("mcp"));

    let blocked = delete_record::<ColumnMetadata, _>(
        &mut store,
        &common::scope_at(2),
        ColumnKey::new("orders", "status"),
        Provenance::Inferred,
    );
    assert!(matches!(blocked, Err(WriteError::PrecedenceBlocked(_))));

    let removed = delete_record::<ColumnMetadata, _>(
        &mut store,
        &common::scope_at(3),
        ColumnKey::new(" orders ", "status"),
        Provenance::Mcp,
    )
    .unwrap();
    assert!(removed.deleted);
}

#[test]
fn blanking_a_required_field_is_invalid_and_writes_nothing() {
    let mut store = InMemoryMetadataStore::new();
    upsert_record::<GlossaryTerm, _>(
        &mut store,
        &common::scope_at(1),
        TermKey::new("Net Revenue"),
        Provenance::Mcp,
        GlossaryTermPatch {
            definition: Some("Gross revenue minus refunds".to_string()),
            ..GlossaryTermPatch::default()
        },
    )
    .unwrap();

    let err = upsert_record::<GlossaryTerm, _>(
        &mut store,
        &common::scope_at(2),
        TermKey::new("Net Revenue"),
        Provenance::Mcp,
        GlossaryTermPatch {
            definition: Some("  ".to_string()),
            aliases: Some(vec!["NR".to_string()]),
            ..GlossaryTermPatch::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, WriteError::InvalidInput(ref message) if message.contains("definition")));

    let stored = MetadataStore::<GlossaryTerm>::get(
        &mut store,
        &common::tenant(),
        &TermKey::new("Net Revenue"),
    )
    .unwrap()
    .unwrap();
    assert_eq!(stored.definition, "Gross revenue minus refunds");
    assert_eq!(stored.aliases, None);
    assert_eq!(stored.header.revision, 1);
}

#[test]
fn records_are_isolated_per_tenant() {
    let mut store = InMemoryMetadataStore::new();
    seed_column(&store, "manual", None);
    let other = TenantId::parse(common::OTHER_TENANT).unwrap();
    let listed = MetadataStore::<ColumnMetadata>::list(&mut store, &other).unwrap();
    assert!(listed.is_empty());
    let own = MetadataStore::<ColumnMetadata>::list(&mut store, &common::tenant()).unwrap();
    assert_eq!(own.len(), 1);
}

/// Store wrapper that bumps the stored revision before each put, simulating
/// a concurrent writer winning the race.
struct RacingStore {
    inner: InMemoryMetadataStore,
    races_left: usize,
    puts: usize,
}

impl MetadataStore<TableMetadata> for RacingStore {
    fn get(&mut self, tenant_id: &TenantId, key: &TableKey) -> Result<Option<TableMetadata>, StoreError> {
        MetadataStore::<TableMetadata>::get(&mut self.inner, tenant_id, key)
    }

    fn put(&mut self, record: &TableMetadata, expected: Option<u64>) -> Result<(), StoreError> {
        self.puts += 1;
        if self.races_left > 0 {
            self.races_left -= 1;
            let mut current =
                MetadataStore::<TableMetadata>::get(&mut self.inner, &record.header.tenant_id, &record.key)?
                    .unwrap();
            let revision = current.header.revision;
            current.header.revision += 1;
            MetadataStore::<TableMetadata>::put(&mut self.inner, &current, Some(revision))?;
        }
        MetadataStore::<TableMetadata>::put(&mut self.inner, record, expected)
    }

    fn delete(&mut self, tenant_id: &TenantId, key: &TableKey) -> Result<bool, StoreError> {
        MetadataStore::<TableMetadata>::delete(&mut self.inner, tenant_id, key)
    }

    fn list(&mut self, tenant_id: &TenantId) -> Result<Vec<TableMetadata>, StoreError> {
        MetadataStore::<TableMetadata>::list(&mut self.inner, tenant_id)
    }
}

fn racing_store(races: usize) -> RacingStore {
    let inner = InMemoryMetadataStore::new();
    let record = TableMetadata::create(
        common::header(Provenance::Inferred),
        TableKey::new("orders"),
        TablePatch::default(),
    )
    .unwrap();
    inner.seed(&record).unwrap();
    RacingStore {
        inner,
        races_left: races,
        puts: 0,
    }
}

#[test]
fn lost_race_is_retried_and_rearbitrated() {
    let mut store = racing_store(1);
    let outcome = upsert_record::<TableMetadata, _>(
        &mut store,
        &common::scope_at(5),
        TableKey::new("orders"),
        Provenance::Mcp,
        TablePatch {
            usage_notes: Some("join on customer_id".to_string()),
            ..TablePatch::default()
        },
    )
    .unwrap();
    assert_eq!(store.puts, 2);
    assert_eq!(outcome.record.header.revision, 3);
}

#[test]
fn persistent_contention_reports_concurrent_modification() {
    let mut store = racing_store(usize::MAX);
    let err = upsert_record::<TableMetadata, _>(
        &mut store,
        &common::scope_at(5),
        TableKey::new("orders"),
        Provenance::Mcp,
        TablePatch::default(),
    )
    .unwrap_err();
    assert!(matches!(err, WriteError::ConcurrentModification));
    assert_eq!(store.puts, MAX_WRITE_ATTEMPTS);
}
