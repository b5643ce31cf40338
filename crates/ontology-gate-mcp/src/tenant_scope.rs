// crates/ontology-gate-mcp/src/tenant_scope.rs
// ============================================================================
// Module: Tenant Scope Manager
// Description: Tenant-bound sessions with guaranteed single release.
// Purpose: Acquire one isolated store session per operation.
// Dependencies: ontology-gate-core, ontology-gate-store-sqlite, async-trait, tokio
// ============================================================================

//! ## Overview
//! A [`TenantScopeProvider`] hands out tenant-bound sessions wrapped in a
//! [`ScopeGuard`]. The guard closes its session exactly once: on
//! [`ScopeGuard::release`] or, failing that, on drop. Drop covers early
//! returns, panics, and cancellation of the operation future.
//!
//! ## Invariants
//! - A session is closed at most once; `close` consumes it.
//! - Acquisition is the only suspending step of the access gate.
//! - The `SQLite` provider is bounded by the store's `r2d2` session pool;
//!   checkout gives up after the pool's connection timeout.
//! - [`ConfiguredScopeProvider`] picks the memory or `SQLite` provider from
//!   the `[store]` config section.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use ontology_gate_config::StoreConfig;
use ontology_gate_core::ColumnMetadata;
use ontology_gate_core::EntityRelationship;
use ontology_gate_core::GlossaryTerm;
use ontology_gate_core::InMemoryMetadataStore;
use ontology_gate_core::KnowledgeFact;
use ontology_gate_core::MetadataRecord;
use ontology_gate_core::MetadataStore;
use ontology_gate_core::StoreError;
use ontology_gate_core::TableMetadata;
use ontology_gate_core::TenantId;
use ontology_gate_config::StoreType;
use ontology_gate_store_sqlite::SqliteMetadataStore;
use ontology_gate_store_sqlite::SqliteStoreError;
use ontology_gate_store_sqlite::SqliteTenantSession;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Scope acquisition failures. All are infrastructure faults.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// No session became available within the acquire timeout.
    #[error("tenant scope acquisition timed out after {0} ms")]
    Timeout(u128),
    /// The backing store could not open a session.
    #[error("tenant scope unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Tenant-bound session over the metadata repositories.
pub trait TenantSession: Send + 'static {
    /// Returns the tenant the session is bound to.
    fn tenant_id(&self) -> TenantId;

    /// Releases the session's underlying resources.
    fn close(self);
}

/// Session usable by every metadata write and read tool.
pub trait MetadataSession:
    TenantSession
    + MetadataStore<TableMetadata>
    + MetadataStore<ColumnMetadata>
    + MetadataStore<EntityRelationship>
    + MetadataStore<GlossaryTerm>
    + MetadataStore<KnowledgeFact>
{
}

impl<S> MetadataSession for S where
    S: TenantSession
        + MetadataStore<TableMetadata>
        + MetadataStore<ColumnMetadata>
        + MetadataStore<EntityRelationship>
        + MetadataStore<GlossaryTerm>
        + MetadataStore<KnowledgeFact>
{
}

/// Source of tenant-scoped sessions.
#[async_trait]
pub trait TenantScopeProvider: Send + Sync {
    /// Session type handed out by this provider.
    type Session: MetadataSession;

    /// Acquires a session bound to `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError`] when no session can be acquired.
    async fn with_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<ScopeGuard<Self::Session>, ScopeError>;
}

// ============================================================================
// SECTION: Scope Guard
// ============================================================================

/// Exclusive owner of one tenant session.
pub struct ScopeGuard<S: TenantSession> {
    /// Held session; `None` once released.
    session: Option<S>,
}

impl<S: TenantSession> ScopeGuard<S> {
    /// Wraps a freshly acquired session.
    #[must_use]
    pub const fn new(session: S) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Returns the tenant of the held session.
    #[must_use]
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.session.as_ref().map(TenantSession::tenant_id)
    }

    /// Returns the held session.
    pub const fn session_mut(&mut self) -> Option<&mut S> {
        self.session.as_mut()
    }

    /// Closes the session now.
    pub fn release(mut self) {
        self.close_held();
    }

    /// Rewraps the held session without closing it.
    #[must_use]
    pub fn map<U: TenantSession>(mut self, wrap: impl FnOnce(S) -> U) -> ScopeGuard<U> {
        ScopeGuard {
            session: self.session.take().map(wrap),
        }
    }

    /// Closes the session if it is still held.
    fn close_held(&mut self) {
        if let Some(session) = self.session.take() {
            session.close();
        }
    }
}

impl<S: TenantSession> Drop for ScopeGuard<S> {
    fn drop(&mut self) {
        self.close_held();
    }
}

// ============================================================================
// SECTION: SQLite Provider
// ============================================================================

impl TenantSession for SqliteTenantSession {
    fn tenant_id(&self) -> TenantId {
        Self::tenant_id(self)
    }

    fn close(self) {
        Self::close(self);
    }
}

/// Tenant scope provider backed by the `SQLite` store.
#[derive(Clone)]
pub struct SqliteTenantScopeProvider {
    /// Shared store; its session pool caps concurrent scopes.
    store: SqliteMetadataStore,
}

impl SqliteTenantScopeProvider {
    /// Builds a provider over an opened store.
    #[must_use]
    pub const fn new(store: SqliteMetadataStore) -> Self {
        Self {
            store,
        }
    }

    /// Opens the store described by the `[store]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the section does not describe a
    /// `SQLite` store or the store cannot be opened.
    pub fn from_config(config: &StoreConfig) -> Result<Self, SqliteStoreError> {
        let sqlite = config.sqlite_config().ok_or_else(|| {
            SqliteStoreError::Invalid("store config does not select sqlite with a path".to_string())
        })?;
        Ok(Self::new(SqliteMetadataStore::open(&sqlite)?))
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &SqliteMetadataStore {
        &self.store
    }
}

#[async_trait]
impl TenantScopeProvider for SqliteTenantScopeProvider {
    type Session = SqliteTenantSession;

    async fn with_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<ScopeGuard<SqliteTenantSession>, ScopeError> {
        let store = self.store.clone();
        let session = tokio::task::spawn_blocking(move || store.session(tenant_id))
            .await
            .map_err(|err| ScopeError::Unavailable(format!("session join failed: {err}")))?
            .map_err(|err| match err {
                SqliteStoreError::Unavailable(_) => {
                    ScopeError::Timeout(self.store.connection_timeout().as_millis())
                }
                other => ScopeError::Unavailable(other.to_string()),
            })?;
        Ok(ScopeGuard::new(session))
    }
}

// ============================================================================
// SECTION: In-Memory Provider
// ============================================================================

/// Acquisition and release counters shared by in-memory sessions.
#[derive(Debug, Default)]
pub struct ScopeCounters {
    /// Sessions handed out.
    acquired: AtomicUsize,
    /// Sessions closed.
    released: AtomicUsize,
}

impl ScopeCounters {
    /// Returns the number of sessions handed out.
    #[must_use]
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// Returns the number of sessions closed.
    #[must_use]
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Returns the number of sessions currently open.
    #[must_use]
    pub fn open(&self) -> usize {
        self.acquired().saturating_sub(self.released())
    }
}

/// In-memory tenant session.
pub struct InMemoryScopedSession {
    /// Bound tenant.
    tenant_id: TenantId,
    /// Shared store.
    store: InMemoryMetadataStore,
    /// Counters updated on close.
    counters: Arc<ScopeCounters>,
}

impl InMemoryScopedSession {
    /// Rejects requests for a tenant other than the bound one.
    fn ensure_tenant(&self, tenant_id: &TenantId) -> Result<(), StoreError> {
        if *tenant_id == self.tenant_id {
            Ok(())
        } else {
            Err(StoreError::Invalid(format!(
                "session for tenant {} cannot access tenant {tenant_id}",
                self.tenant_id
            )))
        }
    }
}

impl TenantSession for InMemoryScopedSession {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn close(self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T: MetadataRecord> MetadataStore<T> for InMemoryScopedSession {
    fn get(&mut self, tenant_id: &TenantId, key: &T::Key) -> Result<Option<T>, StoreError> {
        self.ensure_tenant(tenant_id)?;
        MetadataStore::<T>::get(&mut self.store, tenant_id, key)
    }

    fn put(&mut self, record: &T, expected_revision: Option<u64>) -> Result<(), StoreError> {
        self.ensure_tenant(&record.header().tenant_id)?;
        MetadataStore::<T>::put(&mut self.store, record, expected_revision)
    }

    fn delete(&mut self, tenant_id: &TenantId, key: &T::Key) -> Result<bool, StoreError> {
        self.ensure_tenant(tenant_id)?;
        MetadataStore::<T>::delete(&mut self.store, tenant_id, key)
    }

    fn list(&mut self, tenant_id: &TenantId) -> Result<Vec<T>, StoreError> {
        self.ensure_tenant(tenant_id)?;
        MetadataStore::<T>::list(&mut self.store, tenant_id)
    }
}

/// Tenant scope provider over [`InMemoryMetadataStore`].
#[derive(Clone, Default)]
pub struct InMemoryTenantScopeProvider {
    /// Shared store.
    store: InMemoryMetadataStore,
    /// Acquisition and release counters.
    counters: Arc<ScopeCounters>,
    /// When set, every acquisition fails.
    unavailable: Arc<AtomicBool>,
}

impl InMemoryTenantScopeProvider {
    /// Builds a provider over `store`.
    #[must_use]
    pub fn new(store: InMemoryMetadataStore) -> Self {
        Self {
            store,
            counters: Arc::new(ScopeCounters::default()),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &InMemoryMetadataStore {
        &self.store
    }

    /// Returns the shared counters.
    #[must_use]
    pub fn counters(&self) -> Arc<ScopeCounters> {
        Arc::clone(&self.counters)
    }

    /// Makes subsequent acquisitions fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl TenantScopeProvider for InMemoryTenantScopeProvider {
    type Session = InMemoryScopedSession;

    async fn with_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<ScopeGuard<InMemoryScopedSession>, ScopeError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ScopeError::Unavailable("in-memory store marked unavailable".to_string()));
        }
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(ScopeGuard::new(InMemoryScopedSession {
            tenant_id,
            store: self.store.clone(),
            counters: Arc::clone(&self.counters),
        }))
    }
}

// ============================================================================
// SECTION: Configured Provider
// ============================================================================

/// Session handed out by [`ConfiguredScopeProvider`].
pub enum ConfiguredSession {
    /// In-memory session.
    Memory(InMemoryScopedSession),
    /// `SQLite` session.
    Sqlite(SqliteTenantSession),
}

impl TenantSession for ConfiguredSession {
    fn tenant_id(&self) -> TenantId {
        match self {
            Self::Memory(session) => session.tenant_id(),
            Self::Sqlite(session) => TenantSession::tenant_id(session),
        }
    }

    fn close(self) {
        match self {
            Self::Memory(session) => session.close(),
            Self::Sqlite(session) => TenantSession::close(session),
        }
    }
}

impl<T: MetadataRecord> MetadataStore<T> for ConfiguredSession {
    fn get(&mut self, tenant_id: &TenantId, key: &T::Key) -> Result<Option<T>, StoreError> {
        match self {
            Self::Memory(session) => MetadataStore::<T>::get(session, tenant_id, key),
            Self::Sqlite(session) => MetadataStore::<T>::get(session, tenant_id, key),
        }
    }

    fn put(&mut self, record: &T, expected_revision: Option<u64>) -> Result<(), StoreError> {
        match self {
            Self::Memory(session) => MetadataStore::<T>::put(session, record, expected_revision),
            Self::Sqlite(session) => MetadataStore::<T>::put(session, record, expected_revision),
        }
    }

    fn delete(&mut self, tenant_id: &TenantId, key: &T::Key) -> Result<bool, StoreError> {
        match self {
            Self::Memory(session) => MetadataStore::<T>::delete(session, tenant_id, key),
            Self::Sqlite(session) => MetadataStore::<T>::delete(session, tenant_id, key),
        }
    }

    fn list(&mut self, tenant_id: &TenantId) -> Result<Vec<T>, StoreError> {
        match self {
            Self::Memory(session) => MetadataStore::<T>::list(session, tenant_id),
            Self::Sqlite(session) => MetadataStore::<T>::list(session, tenant_id),
        }
    }
}

/// Tenant scope provider selected by `[store] type`.
#[derive(Clone)]
pub enum ConfiguredScopeProvider {
    /// Process-local store.
    Memory(InMemoryTenantScopeProvider),
    /// Durable `SQLite` store.
    Sqlite(SqliteTenantScopeProvider),
}

impl ConfiguredScopeProvider {
    /// Builds the provider the `[store]` section selects.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the `SQLite` store cannot be opened.
    pub fn from_config(config: &StoreConfig) -> Result<Self, SqliteStoreError> {
        match config.store_type {
            StoreType::Memory => {
                Ok(Self::Memory(InMemoryTenantScopeProvider::new(InMemoryMetadataStore::new())))
            }
            StoreType::Sqlite => SqliteTenantScopeProvider::from_config(config).map(Self::Sqlite),
        }
    }
}

#[async_trait]
impl TenantScopeProvider for ConfiguredScopeProvider {
    type Session = ConfiguredSession;

    async fn with_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<ScopeGuard<ConfiguredSession>, ScopeError> {
        match self {
            Self::Memory(provider) => {
                Ok(provider.with_tenant(tenant_id).await?.map(ConfiguredSession::Memory))
            }
            Self::Sqlite(provider) => {
                Ok(provider.with_tenant(tenant_id).await?.map(ConfiguredSession::Sqlite))
            }
        }
    }
}
