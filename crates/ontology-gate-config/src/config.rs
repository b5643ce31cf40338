// crates/ontology-gate-config/src/config.rs
// ============================================================================
// Module: Ontology Gate Configuration
// Description: Configuration loading and validation for Ontology Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: ontology-gate-core, ontology-gate-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed. Tool-group state and
//! installed features declared here are read-only inputs to the access gate;
//! tenants without an explicit entry fall back to the default tool groups
//! and have no features installed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use ontology_gate_core::FeatureId;
use ontology_gate_core::TenantId;
use ontology_gate_core::ToolGroup;
use ontology_gate_core::ToolGroupSettings;
use ontology_gate_core::ToolGroupsState;
use ontology_gate_store_sqlite::SqliteStoreConfig;
use ontology_gate_store_sqlite::SqliteStoreMode;
use ontology_gate_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "ontology-gate.toml";
/// Environment variable naming the configuration path.
pub const CONFIG_ENV_VAR: &str = "ONTOLOGY_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum number of concurrent tenant sessions.
pub(crate) const MIN_POOL_SIZE: u32 = 1;
/// Maximum number of concurrent tenant sessions.
pub(crate) const MAX_POOL_SIZE: u32 = 64;
/// Maximum wait for a tenant session.
pub(crate) const MAX_ACQUIRE_TIMEOUT_MS: u64 = 60_000;
/// Maximum `SQLite` busy timeout.
pub(crate) const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;
/// Maximum number of tenants with explicit entries.
pub(crate) const MAX_TENANT_ENTRIES: usize = 4_096;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Ontology Gate configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OntologyGateConfig {
    /// Metadata store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Audit output configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Default and per-tenant tool groups.
    #[serde(default)]
    pub tool_groups: ToolGroupsConfig,
    /// Installed add-on features keyed by tenant id.
    #[serde(default)]
    pub features: BTreeMap<String, Vec<String>>,
}

impl OntologyGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit path, then [`CONFIG_ENV_VAR`], then
    /// `ontology-gate.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.audit.validate()?;
        self.tool_groups.validate()?;
        validate_features(&self.features)?;
        Ok(())
    }

    /// Returns the effective tool-group state for a tenant.
    #[must_use]
    pub fn tool_groups_for(&self, tenant_id: &TenantId) -> ToolGroupsState {
        self.tool_groups.state_for(tenant_id)
    }

    /// Returns the add-on features installed for a tenant.
    #[must_use]
    pub fn features_for(&self, tenant_id: &TenantId) -> BTreeSet<FeatureId> {
        self.features
            .iter()
            .filter(|(key, _)| parses_as(key, tenant_id))
            .flat_map(|(_, features)| features.iter().filter_map(|name| FeatureId::parse(name)))
            .collect()
    }

    /// Returns true when the feature is installed for the tenant.
    #[must_use]
    pub fn is_feature_installed(&self, tenant_id: &TenantId, feature: FeatureId) -> bool {
        self.features_for(tenant_id).contains(&feature)
    }
}

// ============================================================================
// SECTION: Store Config
// ============================================================================

/// Metadata store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Use the in-memory store.
    #[default]
    Memory,
    /// Use `SQLite`-backed durable store.
    Sqlite,
}

/// Metadata store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Maximum concurrent tenant sessions.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Maximum wait for a tenant session in milliseconds.
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            pool_size: default_pool_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_POOL_SIZE ..= MAX_POOL_SIZE).contains(&self.pool_size) {
            return Err(ConfigError::Invalid(format!(
                "store pool_size must be between {MIN_POOL_SIZE} and {MAX_POOL_SIZE}"
            )));
        }
        if self.acquire_timeout_ms == 0 || self.acquire_timeout_ms > MAX_ACQUIRE_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "store acquire_timeout_ms must be between 1 and {MAX_ACQUIRE_TIMEOUT_MS}"
            )));
        }
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "store busy_timeout_ms must not exceed {MAX_BUSY_TIMEOUT_MS}"
            )));
        }
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                validate_path_field("store path", path)
            }
        }
    }

    /// Returns the `SQLite` store config for the sqlite backend.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        if self.store_type != StoreType::Sqlite {
            return None;
        }
        let path = self.path.clone()?;
        Some(SqliteStoreConfig {
            path,
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
            max_connections: self.pool_size,
            connection_timeout_ms: self.acquire_timeout_ms,
        })
    }
}

/// Default concurrent tenant sessions.
const fn default_pool_size() -> u32 {
    4
}

/// Default `SQLite` busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// Default tenant session wait.
const fn default_acquire_timeout_ms() -> u64 {
    5_000
}

// ============================================================================
// SECTION: Audit Config
// ============================================================================

/// Audit output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Emit audit events.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Append JSON lines to this file; stderr when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_field("audit path", path)?;
        }
        Ok(())
    }
}

/// Audit output is on unless disabled.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Tool Groups Config
// ============================================================================

/// Tool-group toggles keyed by group name.
pub type ToolGroupTable = BTreeMap<String, ToolGroupSettings>;

/// Default and per-tenant tool-group configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolGroupsConfig {
    /// Groups for tenants without an explicit entry.
    #[serde(default)]
    pub default: ToolGroupTable,
    /// Per-tenant groups; an entry replaces the default entirely.
    #[serde(default)]
    pub tenants: BTreeMap<String, ToolGroupTable>,
}

impl ToolGroupsConfig {
    /// Validates group names, sub-flags, and tenant keys.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_group_table("tool_groups.default", &self.default)?;
        if self.tenants.len() > MAX_TENANT_ENTRIES {
            return Err(ConfigError::Invalid(format!(
                "tool_groups.tenants exceeds {MAX_TENANT_ENTRIES} entries"
            )));
        }
        let mut seen = BTreeSet::new();
        for (tenant, table) in &self.tenants {
            let tenant_id = parse_tenant_key("tool_groups.tenants", tenant)?;
            if !seen.insert(tenant_id) {
                return Err(ConfigError::Invalid(format!(
                    "tool_groups.tenants lists tenant {tenant_id} more than once"
                )));
            }
            validate_group_table(&format!("tool_groups.tenants.{tenant}"), table)?;
        }
        Ok(())
    }

    /// Returns the effective state for a tenant.
    #[must_use]
    pub fn state_for(&self, tenant_id: &TenantId) -> ToolGroupsState {
        let table = self
            .tenants
            .iter()
            .find(|(key, _)| parses_as(key, tenant_id))
            .map_or(&self.default, |(_, table)| table);
        let mut state = ToolGroupsState::new();
        for (name, settings) in table {
            state.set(name.clone(), *settings);
        }
        state
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved config path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured file path.
fn validate_path_field(field: &str, path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates one table of group toggles.
fn validate_group_table(field: &str, table: &ToolGroupTable) -> Result<(), ConfigError> {
    for (name, settings) in table {
        let group = ToolGroup::parse(name)
            .ok_or_else(|| ConfigError::Invalid(format!("{field}: unknown tool group {name}")))?;
        let has_sub_flags = settings.add_query_tools || settings.add_ontology_maintenance;
        if group != ToolGroup::Developer && has_sub_flags {
            return Err(ConfigError::Invalid(format!(
                "{field}.{name}: add_query_tools and add_ontology_maintenance apply only to the \
                 developer group"
            )));
        }
    }
    Ok(())
}

/// Validates the per-tenant feature table.
fn validate_features(features: &BTreeMap<String, Vec<String>>) -> Result<(), ConfigError> {
    if features.len() > MAX_TENANT_ENTRIES {
        return Err(ConfigError::Invalid(format!("features exceeds {MAX_TENANT_ENTRIES} entries")));
    }
    for (tenant, names) in features {
        parse_tenant_key("features", tenant)?;
        for name in names {
            if FeatureId::parse(name).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "features.{tenant}: unknown feature {name}"
                )));
            }
        }
    }
    Ok(())
}

/// Parses a tenant id used as a table key.
fn parse_tenant_key(field: &str, key: &str) -> Result<TenantId, ConfigError> {
    TenantId::parse(key)
        .map_err(|err| ConfigError::Invalid(format!("{field}: invalid tenant id {key}: {err}")))
}

/// Returns true when a table key names the tenant.
fn parses_as(key: &str, tenant_id: &TenantId) -> bool {
    TenantId::parse(key).is_ok_and(|parsed| parsed == *tenant_id)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
