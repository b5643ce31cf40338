// crates/ontology-gate-core/src/core/role.rs
// ============================================================================
// Module: Role Resolution
// Description: Closed role enumeration and effective-role resolution.
// Purpose: Reduce a multi-valued role set to a single privilege level.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Callers may carry several role names. The effective role is the highest
//! ranked recognized name; unrecognized names are ignored and an empty or
//! unrecognized set resolves to [`Role::User`].
//!
//! ## Invariants
//! - Resolution is pure and independent of iteration order.
//! - Ranks are distinct, so ties cannot occur.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Effective privilege level.
///
/// Declaration order matches rank so the derived `Ord` agrees with
/// [`Role::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Restricted end user.
    User,
    /// Data steward.
    Data,
    /// Tenant administrator.
    Admin,
}

impl Role {
    /// Returns the fixed rank of the role.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::User => 0,
            Self::Data => 1,
            Self::Admin => 2,
        }
    }

    /// Returns the canonical role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Data => "data",
            Self::Admin => "admin",
        }
    }

    /// Parses a recognized role name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "user" => Some(Self::User),
            "data" => Some(Self::Data),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Resolves the effective role for a caller's role names.
    #[must_use]
    pub fn resolve<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        roles
            .into_iter()
            .filter_map(|name| Self::parse(name.as_ref()))
            .max_by_key(|role| role.rank())
            .unwrap_or(Self::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
