// crates/ontology-gate-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Metadata Store
// Description: Connection pools, schema, and tenant configuration tables.
// Purpose: Open the database and hand out tenant-scoped sessions.
// Dependencies: ontology-gate-core, r2d2, r2d2_sqlite, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! [`SqliteMetadataStore`] owns two `r2d2` pools over the same database file.
//! The session pool caps live [`SqliteTenantSession`]s at `max_connections`;
//! checkout waits up to `connection_timeout_ms` and the connection returns to
//! the pool when the session is closed or dropped. Tool-group and feature
//! lookups draw from a separate control pool, so a caller holding a session
//! can still read tenant configuration.
//!
//! Every record kind shares one `metadata_records` table keyed by
//! `(tenant_id, kind, natural_key)`. Tool-group state and installed
//! features live in their own per-tenant tables.
//!
//! Security posture: database contents are untrusted and are decoded with
//! tenant and revision cross-checks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use ontology_gate_core::FeatureId;
use ontology_gate_core::StoreError;
use ontology_gate_core::TenantId;
use ontology_gate_core::ToolGroupSettings;
use ontology_gate_core::ToolGroupsState;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

use crate::session::SqliteTenantSession;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default session pool size.
const DEFAULT_MAX_CONNECTIONS: u32 = 4;
/// Default wait for a pooled connection (ms).
const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum encoded size of a single metadata record.
pub const MAX_RECORD_BYTES: usize = 256 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode; lets readers proceed while a session writes.
    #[default]
    Wal,
    /// Delete journal mode.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode.
    #[default]
    Full,
    /// Normal synchronous mode.
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` metadata store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Maximum concurrent tenant sessions.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Wait for a pooled connection before giving up (ms).
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,
}

impl SqliteStoreConfig {
    /// Builds a config with defaults for the given database path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connection_timeout_ms: DEFAULT_CONNECTION_TIMEOUT_MS,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default session pool size.
const fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

/// Returns the default pooled connection wait.
const fn default_connection_timeout_ms() -> u64 {
    DEFAULT_CONNECTION_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// No pooled connection became free within the connection timeout.
    #[error("sqlite store connection unavailable: {0}")]
    Unavailable(String),
    /// Stored row does not match its key or payload.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data or request.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Revision compare-and-set failed.
    #[error("sqlite store revision conflict: {0}")]
    Conflict(String),
    /// Record payload exceeded the size limit.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) | SqliteStoreError::Unavailable(message) => {
                Self::Store(message)
            }
            SqliteStoreError::Corrupt(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Corrupt(message)
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "record_json exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed metadata store.
#[derive(Clone)]
pub struct SqliteMetadataStore {
    /// Pool serving tenant sessions.
    sessions: Pool<SqliteConnectionManager>,
    /// Pool serving configuration lookups and readiness checks.
    control: Pool<SqliteConnectionManager>,
}

impl SqliteMetadataStore {
    /// Opens the store, creating and versioning the schema as needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        validate_pool_limits(config)?;
        ensure_parent_dir(&config.path)?;
        let control = build_pool(config)?;
        let mut connection =
            control.get().map_err(|err| SqliteStoreError::Unavailable(err.to_string()))?;
        initialize_schema(&mut connection)?;
        drop(connection);
        let sessions = build_pool(config)?;
        Ok(Self {
            sessions,
            control,
        })
    }

    /// Checks out a session bound to one tenant.
    ///
    /// Blocks until a pooled connection is free or the connection timeout
    /// elapses.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Unavailable`] when the pool stays
    /// exhausted for the whole connection timeout.
    pub fn session(&self, tenant_id: TenantId) -> Result<SqliteTenantSession, SqliteStoreError> {
        let connection =
            self.sessions.get().map_err(|err| SqliteStoreError::Unavailable(err.to_string()))?;
        Ok(SqliteTenantSession::new(tenant_id, connection))
    }

    /// Returns the number of idle connections in the session pool.
    #[must_use]
    pub fn idle_connections(&self) -> u32 {
        self.sessions.state().idle_connections
    }

    /// Returns the session pool size.
    #[must_use]
    pub fn max_connections(&self) -> u32 {
        self.sessions.max_size()
    }

    /// Returns how long session checkout waits for a free connection.
    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        self.sessions.connection_timeout()
    }

    /// Verifies the database answers queries.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database is unavailable.
    pub fn readiness(&self) -> Result<(), SqliteStoreError> {
        self.with_connection(|connection| {
            connection
                .query_row("SELECT 1", params![], |row| row.get::<_, i64>(0))
                .map(|_| ())
                .map_err(|err| SqliteStoreError::Db(err.to_string()))
        })
    }

    /// Loads the tool-group state for a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the state cannot be read.
    pub fn tool_groups_state(
        &self,
        tenant_id: &TenantId,
    ) -> Result<ToolGroupsState, SqliteStoreError> {
        self.with_connection(|connection| {
            let mut statement = connection
                .prepare(
                    "SELECT group_name, enabled, add_query_tools, add_ontology_maintenance FROM \
                     tool_group_settings WHERE tenant_id = ?1 ORDER BY group_name",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = statement
                .query_map(params![tenant_id.to_string()], |row| {
                    let name: String = row.get(0)?;
                    let settings = ToolGroupSettings {
                        enabled: row.get(1)?,
                        add_query_tools: row.get(2)?,
                        add_ontology_maintenance: row.get(3)?,
                    };
                    Ok((name, settings))
                })
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mut state = ToolGroupsState::new();
            for row in rows {
                let (name, settings) = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                state.set(name, settings);
            }
            Ok(state)
        })
    }

    /// Replaces the settings of one tool group for a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn set_tool_group(
        &self,
        tenant_id: &TenantId,
        group: &str,
        settings: ToolGroupSettings,
    ) -> Result<(), SqliteStoreError> {
        let group = group.trim();
        if group.is_empty() {
            return Err(SqliteStoreError::Invalid("tool group name must be non-empty".to_string()));
        }
        self.with_connection(|connection| {
            connection
                .execute(
                    "INSERT INTO tool_group_settings (tenant_id, group_name, enabled, \
                     add_query_tools, add_ontology_maintenance, updated_at) VALUES (?1, ?2, ?3, \
                     ?4, ?5, ?6) ON CONFLICT(tenant_id, group_name) DO UPDATE SET enabled = \
                     excluded.enabled, add_query_tools = excluded.add_query_tools, \
                     add_ontology_maintenance = excluded.add_ontology_maintenance, updated_at = \
                     excluded.updated_at",
                    params![
                        tenant_id.to_string(),
                        group,
                        settings.enabled,
                        settings.add_query_tools,
                        settings.add_ontology_maintenance,
                        unix_millis()
                    ],
                )
                .map(|_| ())
                .map_err(|err| SqliteStoreError::Db(err.to_string()))
        })
    }

    /// Returns true when the feature is installed for the tenant.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the lookup fails.
    pub fn is_feature_installed(
        &self,
        tenant_id: &TenantId,
        feature: FeatureId,
    ) -> Result<bool, SqliteStoreError> {
        self.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT 1 FROM tenant_features WHERE tenant_id = ?1 AND feature = ?2",
                    params![tenant_id.to_string(), feature.as_str()],
                    |row| row.get::<_, i64>(0),
                )
                .optional()
                .map(|row| row.is_some())
                .map_err(|err| SqliteStoreError::Db(err.to_string()))
        })
    }

    /// Marks a feature as installed for the tenant.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn install_feature(
        &self,
        tenant_id: &TenantId,
        feature: FeatureId,
    ) -> Result<(), SqliteStoreError> {
        self.with_connection(|connection| {
            connection
                .execute(
                    "INSERT OR IGNORE INTO tenant_features (tenant_id, feature, installed_at) \
                     VALUES (?1, ?2, ?3)",
                    params![tenant_id.to_string(), feature.as_str(), unix_millis()],
                )
                .map(|_| ())
                .map_err(|err| SqliteStoreError::Db(err.to_string()))
        })
    }

    /// Removes a feature installation. Returns true when one was removed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn uninstall_feature(
        &self,
        tenant_id: &TenantId,
        feature: FeatureId,
    ) -> Result<bool, SqliteStoreError> {
        self.with_connection(|connection| {
            connection
                .execute(
                    "DELETE FROM tenant_features WHERE tenant_id = ?1 AND feature = ?2",
                    params![tenant_id.to_string(), feature.as_str()],
                )
                .map(|changed| changed > 0)
                .map_err(|err| SqliteStoreError::Db(err.to_string()))
        })
    }

    /// Runs a closure on a control-pool connection outside any tenant session.
    fn with_connection<R>(
        &self,
        run: impl FnOnce(&Connection) -> Result<R, SqliteStoreError>,
    ) -> Result<R, SqliteStoreError> {
        let connection =
            self.control.get().map_err(|err| SqliteStoreError::Unavailable(err.to_string()))?;
        run(&connection)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Rejects pool limits `r2d2` cannot build with.
fn validate_pool_limits(config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    if config.max_connections == 0 {
        return Err(SqliteStoreError::Invalid(
            "max_connections must be greater than zero".to_string(),
        ));
    }
    if config.connection_timeout_ms == 0 {
        return Err(SqliteStoreError::Invalid(
            "connection_timeout_ms must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Builds a connection pool whose connections carry the configured pragmas.
fn build_pool(
    config: &SqliteStoreConfig,
) -> Result<Pool<SqliteConnectionManager>, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
    let pragmas = format!(
        "PRAGMA journal_mode = {}; PRAGMA synchronous = {};",
        config.journal_mode.pragma_value(),
        config.sync_mode.pragma_value()
    );
    let manager = SqliteConnectionManager::file(&config.path).with_flags(flags).with_init(
        move |connection| {
            connection.busy_timeout(busy_timeout)?;
            connection.execute_batch(&pragmas)
        },
    );
    Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_millis(config.connection_timeout_ms))
        .build(manager)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS metadata_records (
                    tenant_id TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    natural_key TEXT NOT NULL,
                    source TEXT NOT NULL,
                    last_edit_source TEXT,
                    revision INTEGER NOT NULL,
                    record_json TEXT NOT NULL,
                    updated_at INTEGER NOT NULL,
                    PRIMARY KEY (tenant_id, kind, natural_key)
                );
                CREATE TABLE IF NOT EXISTS tool_group_settings (
                    tenant_id TEXT NOT NULL,
                    group_name TEXT NOT NULL,
                    enabled INTEGER NOT NULL,
                    add_query_tools INTEGER NOT NULL,
                    add_ontology_maintenance INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL,
                    PRIMARY KEY (tenant_id, group_name)
                );
                CREATE TABLE IF NOT EXISTS tenant_features (
                    tenant_id TEXT NOT NULL,
                    feature TEXT NOT NULL,
                    installed_at INTEGER NOT NULL,
                    PRIMARY KEY (tenant_id, feature)
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
