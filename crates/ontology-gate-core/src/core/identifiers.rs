// crates/ontology-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Ontology Gate Identifiers
// Description: Strongly typed tenant and actor identifiers.
// Purpose: Provide validated, serializable IDs with stable string forms.
// Dependencies: serde, thiserror, uuid
// ============================================================================

//! ## Overview
//! Tenant identifiers arrive as untrusted strings inside caller claims and must
//! parse as UUIDs before any tenant-scoped resource is touched. Actor
//! identifiers record who performed a write; agent calls are attributed to the
//! nil UUID.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// SECTION: Tenant Identifier
// ============================================================================

/// Tenant (project) identifier.
///
/// # Invariants
/// - Always a well-formed UUID; construction from strings goes through [`TenantId::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Wraps an already-parsed UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parses a tenant identifier from its string form.
    ///
    /// # Errors
    ///
    /// Returns [`TenantIdError`] when the value is empty or not a UUID.
    pub fn parse(value: &str) -> Result<Self, TenantIdError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TenantIdError::Empty);
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| TenantIdError::Malformed(trimmed.to_string()))
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TenantId {
    type Err = TenantIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Tenant identifier parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenantIdError {
    /// Tenant identifier was empty.
    #[error("tenant id is empty")]
    Empty,
    /// Tenant identifier is not a UUID.
    #[error("tenant id is not a valid uuid: {0}")]
    Malformed(String),
}

// ============================================================================
// SECTION: Actor Identifier
// ============================================================================

/// Identity recorded against writes.
///
/// # Invariants
/// - The nil UUID is reserved for agent credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Actor id used for agent calls.
    #[must_use]
    pub const fn agent() -> Self {
        Self(Uuid::nil())
    }

    /// Wraps a human user UUID.
    #[must_use]
    pub const fn user(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns true when this actor is the agent sentinel.
    #[must_use]
    pub fn is_agent(&self) -> bool {
        self.0.is_nil()
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}
