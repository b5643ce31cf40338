// crates/ontology-gate-core/src/runtime/precedence.rs
// ============================================================================
// Module: Precedence Arbiter
// Description: Source-precedence decisions for metadata modifications.
// Purpose: Keep lower-trust writers from overwriting higher-trust edits.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! A modification is allowed iff the modifier's rank is at least the rank of
//! the record's effective provenance. The effective provenance is the last
//! edit source when present and non-blank, otherwise the creation source.
//!
//! ## Invariants
//! - Pure and total: unknown labels rank `0` and never error.
//! - Equal ranks allow (an agent may revise its own output).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::provenance::Provenance;
use crate::core::provenance::SourceLabel;
use crate::core::records::RecordHeader;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Details of a blocked modification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecedenceConflict {
    /// Effective provenance of the existing record.
    pub existing: SourceLabel,
    /// Provenance of the rejected modifier.
    pub modifier: Provenance,
}

impl fmt::Display for PrecedenceConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot modify: existing source '{}' has higher precedence than '{}'",
            self.existing, self.modifier
        )
    }
}

/// Outcome of arbitration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PrecedenceDecision {
    /// Modification may proceed.
    Allow {
        /// Effective provenance that was compared against.
        effective: SourceLabel,
    },
    /// Modification is blocked.
    Deny(PrecedenceConflict),
}

impl PrecedenceDecision {
    /// Returns true when the modification may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }
}

// ============================================================================
// SECTION: Arbitration
// ============================================================================

/// Arbitrates a modification against persisted provenance labels.
#[must_use]
pub fn arbitrate(
    existing_source: &SourceLabel,
    existing_last_edit_source: Option<&SourceLabel>,
    modifier: Provenance,
) -> PrecedenceDecision {
    let effective = match existing_last_edit_source {
        Some(label) if !label.is_empty() => label,
        _ => existing_source,
    };
    if modifier.rank() >= effective.rank() {
        PrecedenceDecision::Allow {
            effective: effective.clone(),
        }
    } else {
        PrecedenceDecision::Deny(PrecedenceConflict {
            existing: effective.clone(),
            modifier,
        })
    }
}

/// Returns true when `modifier` may overwrite a record with these labels.
#[must_use]
pub fn can_modify(
    existing_source: &SourceLabel,
    existing_last_edit_source: Option<&SourceLabel>,
    modifier: Provenance,
) -> bool {
    arbitrate(existing_source, existing_last_edit_source, modifier).is_allowed()
}

/// Arbitrates a modification against a record header.
#[must_use]
pub(crate) fn arbitrate_header(header: &RecordHeader, modifier: Provenance) -> PrecedenceDecision {
    arbitrate(&header.source, header.last_edit_source.as_ref(), modifier)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::panic, reason = "Test-only panic-based assertions are permitted.")]

    use super::*;

    fn label(value: &str) -> SourceLabel {
        SourceLabel::new(value)
    }

    #[test]
    fn lower_rank_modifier_is_blocked_and_named() {
        let decision = arbitrate(&label("manual"), None, Provenance::Mcp);
        let PrecedenceDecision::Deny(conflict) = decision else {
            panic!("expected deny");
        };
        assert_eq!(conflict.existing.as_str(), "manual");
        assert_eq!(conflict.modifier, Provenance::Mcp);
        let message = conflict.to_string();
        assert!(message.contains("manual") && message.contains("mcp"));
    }

    #[test]
    fn unknown_and_blank_labels_rank_lowest() {
        assert!(can_modify(&label("legacy_import"), None, Provenance::Inferred));
        assert!(can_modify(&label(""), None, Provenance::Inferred));
    }

    #[test]
    fn blank_last_edit_does_not_shadow_source() {
        assert!(!can_modify(&label("manual"), Some(&label(" ")), Provenance::Mcp));
        assert!(can_modify(&label("manual"), Some(&label("inferred")), Provenance::Mcp));
    }
}
