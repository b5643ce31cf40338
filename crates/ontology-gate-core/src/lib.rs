// crates/ontology-gate-core/src/lib.rs
// ============================================================================
// Module: Ontology Gate Core Library
// Description: Public API surface for the Ontology Gate core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Ontology Gate core decides which tools a caller may invoke and whether an
//! actor may overwrite a semantic-metadata record written by someone else. It
//! is backend-agnostic: storage is reached through [`MetadataStore`] and the
//! core never performs I/O or reads wall-clock time on its own.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::MetadataStore;
pub use interfaces::StoreError;
pub use interfaces::natural_key_string;
pub use runtime::CapabilitySet;
pub use runtime::DeleteOutcome;
pub use runtime::InMemoryMetadataStore;
pub use runtime::MAX_WRITE_ATTEMPTS;
pub use runtime::PrecedenceConflict;
pub use runtime::PrecedenceDecision;
pub use runtime::UpsertOutcome;
pub use runtime::WriteError;
pub use runtime::WriteScope;
pub use runtime::arbitrate;
pub use runtime::can_modify;
pub use runtime::capabilities;
pub use runtime::delete_record;
pub use runtime::required_feature;
pub use runtime::upsert_record;
