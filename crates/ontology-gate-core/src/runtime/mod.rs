// crates/ontology-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Ontology Gate Runtime
// Description: Capability calculation, precedence arbitration, write path.
// Purpose: Hold every access and precedence decision in one place.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules are pure or store-driven; none of them perform transport
//! work. All external surfaces must route through these functions so that
//! capability and precedence decisions stay identical across entry points.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod capabilities;
pub mod precedence;
pub mod store;
pub mod writer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use capabilities::CapabilitySet;
pub use capabilities::capabilities;
pub use capabilities::required_feature;
pub use precedence::PrecedenceConflict;
pub use precedence::PrecedenceDecision;
pub use precedence::arbitrate;
pub use precedence::can_modify;
pub use store::InMemoryMetadataStore;
pub use writer::DeleteOutcome;
pub use writer::MAX_WRITE_ATTEMPTS;
pub use writer::UpsertOutcome;
pub use writer::WriteError;
pub use writer::WriteScope;
pub use writer::delete_record;
pub use writer::upsert_record;
