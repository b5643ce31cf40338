// crates/ontology-gate-mcp/src/lib.rs
// ============================================================================
// Module: Ontology Gate MCP
// Description: Access gate and tool routing for semantic-metadata tools.
// Purpose: Admit tool calls per tenant and route maintenance writes.
// Dependencies: ontology-gate-core, ontology-gate-config, ontology-gate-store-sqlite, tokio
// ============================================================================

//! ## Overview
//! Ontology Gate MCP sits between a tool transport and the metadata store.
//! Each call carries an explicit [`RequestContext`]; the [`AccessGate`]
//! authenticates it, binds a tenant scope, checks the caller's capability set
//! and add-on features, and the [`ToolRouter`] runs the admitted tool.
//! Transport, tool descriptions, and schema/query execution are out of scope.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod context;
pub mod errors;
pub mod gate;
pub mod sources;
pub mod tenant_scope;
pub mod tools;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AccessAuditEvent;
pub use audit::AccessAuditSink;
pub use audit::FaultAuditEvent;
pub use audit::FileAccessAuditSink;
pub use audit::NoopAccessAuditSink;
pub use audit::StderrAccessAuditSink;
pub use audit::WriteAuditEvent;
pub use audit::WriteOutcome;
pub use audit::sink_from_config;
pub use context::RequestContext;
pub use context::ScopedContext;
pub use errors::Denial;
pub use errors::DenialCode;
pub use errors::GateBuildError;
pub use errors::GateError;
pub use errors::INTERNAL_ERROR_MESSAGE;
pub use errors::ToolError;
pub use gate::AccessGate;
pub use gate::AccessGateConfig;
pub use gate::GateGrant;
pub use sources::ConfigFeatureChecker;
pub use sources::ConfigToolGroupSource;
pub use sources::FeatureInstallationChecker;
pub use sources::SourceError;
pub use sources::SqliteFeatureChecker;
pub use sources::SqliteToolGroupSource;
pub use sources::ToolGroupSource;
pub use tenant_scope::ConfiguredScopeProvider;
pub use tenant_scope::ConfiguredSession;
pub use tenant_scope::InMemoryScopedSession;
pub use tenant_scope::InMemoryTenantScopeProvider;
pub use tenant_scope::MetadataSession;
pub use tenant_scope::ScopeCounters;
pub use tenant_scope::ScopeError;
pub use tenant_scope::ScopeGuard;
pub use tenant_scope::SqliteTenantScopeProvider;
pub use tenant_scope::TenantScopeProvider;
pub use tenant_scope::TenantSession;
pub use tools::ToolDelegate;
pub use tools::ToolRouter;
pub use tools::UnsupportedToolDelegate;
