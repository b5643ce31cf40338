// crates/ontology-gate-core/src/runtime/store.rs
// ============================================================================
// Module: Ontology Gate In-Memory Store
// Description: In-memory metadata store for tests and local tooling.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! One [`InMemoryMetadataStore`] holds every record kind for every tenant.
//! Records are stored as JSON values so a single map serves all kinds, the
//! same way the durable store keeps one table. Clones share state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use serde_json::Value;

use crate::core::identifiers::TenantId;
use crate::core::records::MetadataRecord;
use crate::core::records::RecordKind;
use crate::interfaces::MetadataStore;
use crate::interfaces::StoreError;
use crate::interfaces::natural_key_string;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Composite row key: tenant, kind, canonical natural key.
type RowKey = (TenantId, RecordKind, String);

/// In-memory metadata store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMetadataStore {
    /// Rows keyed by tenant, kind, and natural key.
    rows: Arc<Mutex<BTreeMap<RowKey, Value>>>,
}

impl InMemoryMetadataStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record verbatim, bypassing revision checks.
    ///
    /// Used to seed fixtures such as records written by the inference
    /// pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record cannot be encoded.
    pub fn seed<T: MetadataRecord>(&self, record: &T) -> Result<(), StoreError> {
        let key = row_key::<T>(&record.header().tenant_id, record.key())?;
        let value = serde_json::to_value(record).map_err(|err| StoreError::Invalid(err.to_string()))?;
        self.lock()?.insert(key, value);
        Ok(())
    }

    /// Locks the row map.
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<RowKey, Value>>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Store("metadata store mutex poisoned".to_string()))
    }
}

/// Builds the composite row key for a record kind.
fn row_key<T: MetadataRecord>(tenant_id: &TenantId, key: &T::Key) -> Result<RowKey, StoreError> {
    Ok((*tenant_id, T::KIND, natural_key_string::<T>(key)?))
}

/// Decodes a stored row.
fn decode<T: MetadataRecord>(value: &Value) -> Result<T, StoreError> {
    serde_json::from_value(value.clone()).map_err(|err| StoreError::Corrupt(err.to_string()))
}

impl<T: MetadataRecord> MetadataStore<T> for InMemoryMetadataStore {
    fn get(&mut self, tenant_id: &TenantId, key: &T::Key) -> Result<Option<T>, StoreError> {
        let row = row_key::<T>(tenant_id, key)?;
        self.lock()?.get(&row).map(decode::<T>).transpose()
    }

    fn put(&mut self, record: &T, expected_revision: Option<u64>) -> Result<(), StoreError> {
        let row = row_key::<T>(&record.header().tenant_id, record.key())?;
        let value = serde_json::to_value(record).map_err(|err| StoreError::Invalid(err.to_string()))?;
        let mut rows = self.lock()?;
        let current = rows.get(&row).map(decode::<T>).transpose()?.map(|rec| rec.header().revision);
        if current != expected_revision {
            return Err(StoreError::Conflict(format!(
                "{} {} changed concurrently",
                T::KIND,
                row.2
            )));
        }
        rows.insert(row, value);
        Ok(())
    }

    fn delete(&mut self, tenant_id: &TenantId, key: &T::Key) -> Result<bool, StoreError> {
        let row = row_key::<T>(tenant_id, key)?;
        Ok(self.lock()?.remove(&row).is_some())
    }

    fn list(&mut self, tenant_id: &TenantId) -> Result<Vec<T>, StoreError> {
        let rows = self.lock()?;
        rows.iter()
            .filter(|((tenant, kind, _), _)| tenant == tenant_id && *kind == T::KIND)
            .map(|(_, value)| decode::<T>(value))
            .collect()
    }
}
