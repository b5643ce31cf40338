// crates/ontology-gate-config/src/lib.rs
// ============================================================================
// Module: Ontology Gate Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for ontology-gate.toml semantics.
// Dependencies: ontology-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `ontology-gate-config` defines the configuration model for Ontology Gate:
//! storage, audit output, default and per-tenant tool groups, and installed
//! add-on features. Validation is strict and fails closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
