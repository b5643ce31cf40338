// crates/ontology-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Ontology Gate Interfaces
// Description: Backend-agnostic storage contract for metadata records.
// Purpose: Define the repository surface used by the metadata write path.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! A [`MetadataStore`] is one tenant-scoped view of persisted metadata for a
//! single record kind. Implementations are reached only through a tenant
//! scope, so every call is already bound to the caller's tenant; the tenant
//! argument exists so implementations can reject cross-tenant access.
//!
//! Security posture: persisted records are untrusted input; provenance
//! labels in them may be blank or unrecognized.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::TenantId;
use crate::core::records::MetadataRecord;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Metadata store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Only [`StoreError::Conflict`] is actionable by callers; every other
///   variant is an infrastructure fault.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("metadata store io error: {0}")]
    Io(String),
    /// Persisted data failed to decode.
    #[error("metadata store corruption: {0}")]
    Corrupt(String),
    /// Persisted data belongs to a different tenant or kind.
    #[error("metadata store invalid data: {0}")]
    Invalid(String),
    /// Compare-and-set failed: the row changed since it was read.
    #[error("metadata store revision conflict: {0}")]
    Conflict(String),
    /// Store reported an error.
    #[error("metadata store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Metadata Store
// ============================================================================

/// Repository for one metadata record kind.
pub trait MetadataStore<T: MetadataRecord> {
    /// Loads the live record for a natural key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get(&mut self, tenant_id: &TenantId, key: &T::Key) -> Result<Option<T>, StoreError>;

    /// Writes a record with a revision compare-and-set.
    ///
    /// `expected_revision` of `None` requires that no live record exists;
    /// `Some(n)` requires the live record to be at revision `n`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the expectation does not hold.
    fn put(&mut self, record: &T, expected_revision: Option<u64>) -> Result<(), StoreError>;

    /// Deletes the live record for a natural key.
    ///
    /// Returns `true` when a record was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails.
    fn delete(&mut self, tenant_id: &TenantId, key: &T::Key) -> Result<bool, StoreError>;

    /// Lists every live record of this kind for the tenant, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list(&mut self, tenant_id: &TenantId) -> Result<Vec<T>, StoreError>;
}

/// Encodes a natural key into the canonical string stores index on.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] when the key cannot be serialized.
pub fn natural_key_string<T: MetadataRecord>(key: &T::Key) -> Result<String, StoreError> {
    serde_json::to_string(key).map_err(|err| StoreError::Invalid(err.to_string()))
}
