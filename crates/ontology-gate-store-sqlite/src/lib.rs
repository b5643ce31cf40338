// crates/ontology-gate-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Metadata Store
// Description: Durable metadata repositories backend using SQLite.
// Purpose: Provide tenant-scoped persistence for Ontology Gate records.
// Dependencies: ontology-gate-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed implementation of
//! [`ontology_gate_core::MetadataStore`] for every record kind, reached
//! through [`SqliteTenantSession`] values checked out of a connection pool.
//! It also persists per-tenant tool-group state and installed add-on
//! features. Security posture: storage inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod session;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use session::SqliteTenantSession;
pub use store::MAX_RECORD_BYTES;
pub use store::SqliteMetadataStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
