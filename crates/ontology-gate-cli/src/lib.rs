// crates/ontology-gate-cli/src/lib.rs
// ============================================================================
// Module: Ontology Gate CLI Library
// Description: Shared helpers for the `ontology-gate` binary.
// Purpose: Expose the message catalog and report builders to the binary and tests.
// Dependencies: ontology-gate-core, ontology-gate-config, serde_json
// ============================================================================

//! ## Overview
//! Library half of the `ontology-gate` CLI. The binary parses arguments and
//! writes output; the report builders here compute what it prints.

pub mod i18n;
pub mod reports;
