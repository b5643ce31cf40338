// crates/ontology-gate-core/src/core/provenance.rs
// ============================================================================
// Module: Provenance
// Description: Writer classes for metadata records and their trust ranks.
// Purpose: Provide the closed provenance enum and the persisted source label.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every mutable metadata record remembers which class of actor created it
//! and which class edited it last. Writers are always one of the closed
//! [`Provenance`] classes, but persisted labels are untrusted data and may
//! hold values this build does not recognize; those rank `0`.
//!
//! ## Invariants
//! - `manual (3) > mcp (2) > inferred (1) > unknown (0)`.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Provenance
// ============================================================================

/// Class of actor writing a metadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Automated extraction / inference pipeline.
    Inferred,
    /// Agent writing through the tool surface.
    Mcp,
    /// Human writing through direct administration.
    Manual,
}

impl Provenance {
    /// Rank assigned to labels that are not a known provenance.
    pub const UNKNOWN_RANK: u8 = 0;

    /// Returns the trust rank.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Inferred => 1,
            Self::Mcp => 2,
            Self::Manual => 3,
        }
    }

    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inferred => "inferred",
            Self::Mcp => "mcp",
            Self::Manual => "manual",
        }
    }

    /// Parses a canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "inferred" => Some(Self::Inferred),
            "mcp" => Some(Self::Mcp),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }

    /// Returns all provenance classes in ascending rank.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Inferred, Self::Mcp, Self::Manual]
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Source Label
// ============================================================================

/// Provenance label as persisted on a record.
///
/// # Invariants
/// - Unrecognized labels are preserved verbatim and rank
///   [`Provenance::UNKNOWN_RANK`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceLabel(String);

impl SourceLabel {
    /// Wraps a raw persisted label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the label carries no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Returns the recognized provenance, if any.
    #[must_use]
    pub fn provenance(&self) -> Option<Provenance> {
        Provenance::parse(self.0.trim())
    }

    /// Returns the trust rank of the label.
    #[must_use]
    pub fn rank(&self) -> u8 {
        self.provenance().map_or(Provenance::UNKNOWN_RANK, Provenance::rank)
    }
}

impl From<Provenance> for SourceLabel {
    fn from(value: Provenance) -> Self {
        Self(value.as_str().to_string())
    }
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() { f.write_str("unknown") } else { f.write_str(&self.0) }
    }
}
