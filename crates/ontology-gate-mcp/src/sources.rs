// crates/ontology-gate-mcp/src/sources.rs
// ============================================================================
// Module: Tenant Configuration Sources
// Description: Tool-group state and feature-installation lookups.
// Purpose: Feed per-tenant configuration into the access gate.
// Dependencies: ontology-gate-core, ontology-gate-config, ontology-gate-store-sqlite, async-trait, tokio
// ============================================================================

//! ## Overview
//! The access gate reads two kinds of tenant configuration: which tool
//! groups are enabled and which add-on features are installed. Each has a
//! config-file backed source and a `SQLite` backed source. Lookups are
//! consulted on every acquisition; nothing is cached. The `SQLite` sources
//! run their queries on the blocking thread pool.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use ontology_gate_config::OntologyGateConfig;
use ontology_gate_core::FeatureId;
use ontology_gate_core::TenantId;
use ontology_gate_core::ToolGroupsState;
use ontology_gate_store_sqlite::SqliteMetadataStore;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration lookup failure.
#[derive(Debug, Error)]
#[error("configuration source unavailable: {0}")]
pub struct SourceError(pub String);

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Tool-group configuration service.
#[async_trait]
pub trait ToolGroupSource: Send + Sync {
    /// Returns the tool-group state for a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the state cannot be loaded.
    async fn tool_groups_state(&self, tenant_id: TenantId) -> Result<ToolGroupsState, SourceError>;
}

/// Feature-installation checker.
#[async_trait]
pub trait FeatureInstallationChecker: Send + Sync {
    /// Returns whether `feature` is installed for the tenant.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when installation state cannot be determined.
    async fn is_installed(&self, tenant_id: TenantId, feature: FeatureId) -> Result<bool, SourceError>;
}

// ============================================================================
// SECTION: Config-Backed Sources
// ============================================================================

/// Tool groups taken from `ontology-gate.toml`.
#[derive(Clone)]
pub struct ConfigToolGroupSource {
    /// Loaded configuration.
    config: Arc<OntologyGateConfig>,
}

impl ConfigToolGroupSource {
    /// Wraps a loaded configuration.
    #[must_use]
    pub const fn new(config: Arc<OntologyGateConfig>) -> Self {
        Self {
            config,
        }
    }
}

#[async_trait]
impl ToolGroupSource for ConfigToolGroupSource {
    async fn tool_groups_state(&self, tenant_id: TenantId) -> Result<ToolGroupsState, SourceError> {
        Ok(self.config.tool_groups_for(&tenant_id))
    }
}

/// Feature installations taken from `ontology-gate.toml`.
#[derive(Clone)]
pub struct ConfigFeatureChecker {
    /// Loaded configuration.
    config: Arc<OntologyGateConfig>,
}

impl ConfigFeatureChecker {
    /// Wraps a loaded configuration.
    #[must_use]
    pub const fn new(config: Arc<OntologyGateConfig>) -> Self {
        Self {
            config,
        }
    }
}

#[async_trait]
impl FeatureInstallationChecker for ConfigFeatureChecker {
    async fn is_installed(&self, tenant_id: TenantId, feature: FeatureId) -> Result<bool, SourceError> {
        Ok(self.config.is_feature_installed(&tenant_id, feature))
    }
}

// ============================================================================
// SECTION: SQLite-Backed Sources
// ============================================================================

/// Tool groups stored in the `tool_group_settings` table.
#[derive(Clone)]
pub struct SqliteToolGroupSource {
    /// Shared store.
    store: SqliteMetadataStore,
}

impl SqliteToolGroupSource {
    /// Wraps a store.
    #[must_use]
    pub const fn new(store: SqliteMetadataStore) -> Self {
        Self {
            store,
        }
    }
}

#[async_trait]
impl ToolGroupSource for SqliteToolGroupSource {
    async fn tool_groups_state(&self, tenant_id: TenantId) -> Result<ToolGroupsState, SourceError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.tool_groups_state(&tenant_id))
            .await
            .map_err(|err| SourceError(format!("tool group lookup join failed: {err}")))?
            .map_err(|err| SourceError(err.to_string()))
    }
}

/// Feature installations stored in the `tenant_features` table.
#[derive(Clone)]
pub struct SqliteFeatureChecker {
    /// Shared store.
    store: SqliteMetadataStore,
}

impl SqliteFeatureChecker {
    /// Wraps a store.
    #[must_use]
    pub const fn new(store: SqliteMetadataStore) -> Self {
        Self {
            store,
        }
    }
}

#[async_trait]
impl FeatureInstallationChecker for SqliteFeatureChecker {
    async fn is_installed(&self, tenant_id: TenantId, feature: FeatureId) -> Result<bool, SourceError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.is_feature_installed(&tenant_id, feature))
            .await
            .map_err(|err| SourceError(format!("feature lookup join failed: {err}")))?
            .map_err(|err| SourceError(err.to_string()))
    }
}
