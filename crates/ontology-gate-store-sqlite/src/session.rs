// crates/ontology-gate-store-sqlite/src/session.rs
// ============================================================================
// Module: SQLite Tenant Session
// Description: Tenant-bound connection implementing every metadata repository.
// Purpose: Persist metadata records with revision compare-and-set semantics.
// Dependencies: ontology-gate-core, r2d2, r2d2_sqlite, rusqlite, serde_json
// ============================================================================

//! ## Overview
//! A [`SqliteTenantSession`] owns one pooled connection for the duration of
//! a single operation and is bound to one tenant. Every query is filtered by
//! that tenant; requests naming a different tenant fail as invalid. The
//! connection is an `r2d2` pooled handle and returns to the pool exactly once,
//! on [`SqliteTenantSession::close`] or on drop.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ontology_gate_core::MetadataRecord;
use ontology_gate_core::MetadataStore;
use ontology_gate_core::StoreError;
use ontology_gate_core::TenantId;
use ontology_gate_core::natural_key_string;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::store::MAX_RECORD_BYTES;
use crate::store::SqliteStoreError;

// ============================================================================
// SECTION: Session
// ============================================================================

/// Tenant-bound database session.
pub struct SqliteTenantSession {
    /// Tenant every query is filtered by.
    tenant_id: TenantId,
    /// Pooled connection; dropping it returns it to the pool.
    connection: PooledConnection<SqliteConnectionManager>,
}

impl SqliteTenantSession {
    /// Wraps a checked-out connection.
    pub(crate) fn new(
        tenant_id: TenantId,
        connection: PooledConnection<SqliteConnectionManager>,
    ) -> Self {
        Self {
            tenant_id,
            connection,
        }
    }

    /// Returns the tenant this session is bound to.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the connection to the pool.
    pub fn close(self) {
        drop(self.connection);
    }

    /// Rejects requests for a tenant other than the bound one.
    fn ensure_tenant(&self, tenant_id: &TenantId) -> Result<(), SqliteStoreError> {
        if *tenant_id == self.tenant_id {
            Ok(())
        } else {
            Err(SqliteStoreError::Invalid(format!(
                "session for tenant {} cannot access tenant {tenant_id}",
                self.tenant_id
            )))
        }
    }

    /// Loads one record.
    fn load_record<T: MetadataRecord>(
        &self,
        tenant_id: &TenantId,
        key: &T::Key,
    ) -> Result<Option<T>, SqliteStoreError> {
        self.ensure_tenant(tenant_id)?;
        let natural_key = encode_key::<T>(key)?;
        let tenant = tenant_id.to_string();
        let row: Option<(String, i64)> = self
            .connection
            .query_row(
                "SELECT record_json, revision FROM metadata_records WHERE tenant_id = ?1 AND kind \
                 = ?2 AND natural_key = ?3",
                params![tenant, T::KIND.as_str(), natural_key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        row.map(|(json, revision)| decode_record::<T>(tenant_id, &json, revision)).transpose()
    }

    /// Writes one record with a revision compare-and-set.
    fn save_record<T: MetadataRecord>(
        &self,
        record: &T,
        expected_revision: Option<u64>,
    ) -> Result<(), SqliteStoreError> {
        let header = record.header();
        self.ensure_tenant(&header.tenant_id)?;
        let natural_key = encode_key::<T>(record.key())?;
        let json = serde_json::to_string(record)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        if json.len() > MAX_RECORD_BYTES {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: MAX_RECORD_BYTES,
                actual_bytes: json.len(),
            });
        }
        let revision = to_sql_revision(header.revision)?;
        let tenant = header.tenant_id.to_string();
        let last_edit = header.last_edit_source.as_ref().map(|label| label.as_str().to_string());
        let updated_at = header.updated_at.as_unix_millis();
        let connection = &self.connection;
        let changed = match expected_revision {
            None => connection.execute(
                "INSERT INTO metadata_records (tenant_id, kind, natural_key, source, \
                 last_edit_source, revision, record_json, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, \
                 ?6, ?7, ?8) ON CONFLICT(tenant_id, kind, natural_key) DO NOTHING",
                params![
                    tenant,
                    T::KIND.as_str(),
                    natural_key,
                    header.source.as_str(),
                    last_edit,
                    revision,
                    json,
                    updated_at
                ],
            ),
            Some(expected) => connection.execute(
                "UPDATE metadata_records SET source = ?4, last_edit_source = ?5, revision = ?6, \
                 record_json = ?7, updated_at = ?8 WHERE tenant_id = ?1 AND kind = ?2 AND \
                 natural_key = ?3 AND revision = ?9",
                params![
                    tenant,
                    T::KIND.as_str(),
                    natural_key,
                    header.source.as_str(),
                    last_edit,
                    revision,
                    json,
                    updated_at,
                    to_sql_revision(expected)?
                ],
            ),
        }
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if changed == 0 {
            return Err(SqliteStoreError::Conflict(format!(
                "{} {natural_key} changed concurrently",
                T::KIND
            )));
        }
        Ok(())
    }

    /// Deletes one record.
    fn delete_row<T: MetadataRecord>(
        &self,
        tenant_id: &TenantId,
        key: &T::Key,
    ) -> Result<bool, SqliteStoreError> {
        self.ensure_tenant(tenant_id)?;
        let natural_key = encode_key::<T>(key)?;
        let tenant = tenant_id.to_string();
        let changed = self
            .connection
            .execute(
                "DELETE FROM metadata_records WHERE tenant_id = ?1 AND kind = ?2 AND natural_key \
                 = ?3",
                params![tenant, T::KIND.as_str(), natural_key],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(changed > 0)
    }

    /// Lists every record of one kind for the tenant.
    fn list_records<T: MetadataRecord>(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<T>, SqliteStoreError> {
        self.ensure_tenant(tenant_id)?;
        let tenant = tenant_id.to_string();
        let mut statement = self
            .connection
            .prepare(
                "SELECT record_json, revision FROM metadata_records WHERE tenant_id = ?1 AND kind \
                 = ?2 ORDER BY natural_key",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![tenant, T::KIND.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut records = Vec::new();
        for row in rows {
            let (json, revision) = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            records.push(decode_record::<T>(tenant_id, &json, revision)?);
        }
        Ok(records)
    }
}

impl<T: MetadataRecord> MetadataStore<T> for SqliteTenantSession {
    fn get(&mut self, tenant_id: &TenantId, key: &T::Key) -> Result<Option<T>, StoreError> {
        self.load_record::<T>(tenant_id, key).map_err(StoreError::from)
    }

    fn put(&mut self, record: &T, expected_revision: Option<u64>) -> Result<(), StoreError> {
        self.save_record(record, expected_revision).map_err(StoreError::from)
    }

    fn delete(&mut self, tenant_id: &TenantId, key: &T::Key) -> Result<bool, StoreError> {
        self.delete_row::<T>(tenant_id, key).map_err(StoreError::from)
    }

    fn list(&mut self, tenant_id: &TenantId) -> Result<Vec<T>, StoreError> {
        self.list_records::<T>(tenant_id).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Encodes a natural key for the `natural_key` column.
fn encode_key<T: MetadataRecord>(key: &T::Key) -> Result<String, SqliteStoreError> {
    natural_key_string::<T>(key).map_err(|err| SqliteStoreError::Invalid(err.to_string()))
}

/// Converts a record revision to its column representation.
fn to_sql_revision(revision: u64) -> Result<i64, SqliteStoreError> {
    i64::try_from(revision)
        .map_err(|_| SqliteStoreError::Invalid(format!("revision {revision} out of range")))
}

/// Decodes a stored record and cross-checks it against its row.
fn decode_record<T: MetadataRecord>(
    tenant_id: &TenantId,
    json: &str,
    revision: i64,
) -> Result<T, SqliteStoreError> {
    if json.len() > MAX_RECORD_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_RECORD_BYTES,
            actual_bytes: json.len(),
        });
    }
    let record: T =
        serde_json::from_str(json).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))?;
    let header = record.header();
    if header.tenant_id != *tenant_id {
        return Err(SqliteStoreError::Corrupt(format!(
            "{} row stored under tenant {tenant_id} names tenant {}",
            T::KIND,
            header.tenant_id
        )));
    }
    if to_sql_revision(header.revision)? != revision {
        return Err(SqliteStoreError::Corrupt(format!(
            "{} row revision {revision} does not match payload revision {}",
            T::KIND,
            header.revision
        )));
    }
    Ok(record)
}
