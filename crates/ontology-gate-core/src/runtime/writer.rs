// crates/ontology-gate-core/src/runtime/writer.rs
// ============================================================================
// Module: Metadata Write Path
// Description: Precedence-checked upsert and idempotent delete.
// Purpose: Apply one metadata modification on behalf of an actor class.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! Upsert reads the live record, creates it when absent, and otherwise asks
//! the precedence arbiter before merging the patch. The final write is a
//! revision compare-and-set; a lost race re-reads and re-arbitrates, up to
//! [`MAX_WRITE_ATTEMPTS`] times.
//!
//! ## Invariants
//! - A blocked modification performs no write.
//! - `source` is set only on creation; updates set `last_edit_source`.
//! - Fields absent from a patch keep their stored values.
//! - Deleting an absent record succeeds with `deleted = false`.
//! - Deleting a live record is arbitrated like an update; a blocked delete
//!   leaves the record in place.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::ActorId;
use crate::core::identifiers::TenantId;
use crate::core::provenance::Provenance;
use crate::core::records::MetadataRecord;
use crate::core::records::RecordHeader;
use crate::core::time::Timestamp;
use crate::interfaces::MetadataStore;
use crate::interfaces::StoreError;
use crate::runtime::precedence::PrecedenceConflict;
use crate::runtime::precedence::PrecedenceDecision;
use crate::runtime::precedence::arbitrate_header;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Attempts made before a contended write reports a concurrent modification.
pub const MAX_WRITE_ATTEMPTS: usize = 3;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Tenant, actor, and clock for one write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteScope {
    /// Tenant the write is bound to.
    pub tenant_id: TenantId,
    /// Acting identity stamped by the write variant of the gate.
    pub actor: Option<ActorId>,
    /// Host-supplied time.
    pub now: Timestamp,
}

/// Result of an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome<T> {
    /// Record as persisted.
    pub record: T,
    /// True when the record did not exist before.
    pub created: bool,
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// True when a live record was removed.
    pub deleted: bool,
}

/// Write path errors.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Key or payload failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Existing record has higher-precedence provenance.
    #[error("{0}")]
    PrecedenceBlocked(PrecedenceConflict),
    /// Record kept changing underneath the write.
    #[error("record was modified concurrently; retry the operation")]
    ConcurrentModification,
    /// Underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Upsert
// ============================================================================

/// Creates or updates a record on behalf of `modifier`.
///
/// # Errors
///
/// Returns [`WriteError::InvalidInput`] for blank keys or missing or blanked
/// required fields, [`WriteError::PrecedenceBlocked`] when the existing record
/// outranks the modifier, [`WriteError::ConcurrentModification`] after
/// [`MAX_WRITE_ATTEMPTS`] lost races, and [`WriteError::Store`] on store
/// faults.
pub fn upsert_record<T, S>(
    store: &mut S,
    scope: &WriteScope,
    key: T::Key,
    modifier: Provenance,
    patch: T::Patch,
) -> Result<UpsertOutcome<T>, WriteError>
where
    T: MetadataRecord,
    S: MetadataStore<T> + ?Sized,
{
    let key = T::normalize_key(key).map_err(WriteError::InvalidInput)?;
    for _ in 0 .. MAX_WRITE_ATTEMPTS {
        match attempt_upsert(store, scope, &key, modifier, patch.clone()) {
            Err(WriteError::Store(StoreError::Conflict(_))) => {}
            outcome => return outcome,
        }
    }
    Err(WriteError::ConcurrentModification)
}

/// Runs one read-arbitrate-write cycle.
fn attempt_upsert<T, S>(
    store: &mut S,
    scope: &WriteScope,
    key: &T::Key,
    modifier: Provenance,
    patch: T::Patch,
) -> Result<UpsertOutcome<T>, WriteError>
where
    T: MetadataRecord,
    S: MetadataStore<T> + ?Sized,
{
    let Some(mut record) = store.get(&scope.tenant_id, key)? else {
        let header = RecordHeader::new(scope.tenant_id, modifier.into(), scope.actor, scope.now);
        let record = T::create(header, key.clone(), patch).map_err(WriteError::InvalidInput)?;
        store.put(&record, None)?;
        return Ok(UpsertOutcome {
            record,
            created: true,
        });
    };

    if record.header().tenant_id != scope.tenant_id {
        return Err(WriteError::Store(StoreError::Invalid(format!(
            "{} record returned for another tenant",
            T::KIND
        ))));
    }
    if let PrecedenceDecision::Deny(conflict) = arbitrate_header(record.header(), modifier) {
        return Err(WriteError::PrecedenceBlocked(conflict));
    }

    let expected = record.header().revision;
    record.apply(patch).map_err(WriteError::InvalidInput)?;
    let header = record.header_mut();
    header.last_edit_source = Some(modifier.into());
    header.revision = expected.saturating_add(1);
    header.updated_by = scope.actor.or(header.updated_by);
    header.updated_at = scope.now;
    store.put(&record, Some(expected))?;
    Ok(UpsertOutcome {
        record,
        created: false,
    })
}

// ============================================================================
// SECTION: Delete
// ============================================================================

/// Deletes a record on behalf of `modifier`. Absent records are not an
/// error.
///
/// # Errors
///
/// Returns [`WriteError::InvalidInput`] for blank keys,
/// [`WriteError::PrecedenceBlocked`] when the live record outranks the
/// modifier, and [`WriteError::Store`] on store faults.
pub fn delete_record<T, S>(
    store: &mut S,
    scope: &WriteScope,
    key: T::Key,
    modifier: Provenance,
) -> Result<DeleteOutcome, WriteError>
where
    T: MetadataRecord,
    S: MetadataStore<T> + ?Sized,
{
    let key = T::normalize_key(key).map_err(WriteError::InvalidInput)?;
    let Some(record) = store.get(&scope.tenant_id, &key)? else {
        return Ok(DeleteOutcome {
            deleted: false,
        });
    };
    if let PrecedenceDecision::Deny(conflict) = arbitrate_header(record.header(), modifier) {
        return Err(WriteError::PrecedenceBlocked(conflict));
    }
    let deleted = store.delete(&scope.tenant_id, &key)?;
    Ok(DeleteOutcome {
        deleted,
    })
}
