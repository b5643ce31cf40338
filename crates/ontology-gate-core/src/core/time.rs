// crates/ontology-gate-core/src/core/time.rs
// ============================================================================
// Module: Ontology Gate Time Model
// Description: Timestamp values stamped onto metadata records.
// Purpose: Keep wall-clock reads out of the core.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The core never reads wall-clock time directly; hosts supply timestamps
//! through [`crate::runtime::WriteScope`].

use serde::Deserialize;
use serde::Serialize;

/// Unix epoch milliseconds.
///
/// # Invariants
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Builds a timestamp from unix milliseconds.
    #[must_use]
    pub const fn from_unix_millis(value: i64) -> Self {
        Self(value)
    }

    /// Returns the timestamp as unix milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }
}
