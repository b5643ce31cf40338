// crates/ontology-gate-core/src/core/claims.rs
// ============================================================================
// Module: Caller Claims
// Description: Authenticated caller identity for a single request.
// Purpose: Classify credentials and derive tenant, role, and actor values.
// Dependencies: serde, thiserror, uuid
// ============================================================================

//! ## Overview
//! [`Claims`] are produced by the transport layer once per request and are
//! read-only to the core. The subject either equals [`AGENT_SUBJECT`] (agent
//! credentials) or carries a human user UUID.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::core::identifiers::ActorId;
use crate::core::identifiers::TenantId;
use crate::core::identifiers::TenantIdError;
use crate::core::role::Role;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Subject value carried by agent credentials.
pub const AGENT_SUBJECT: &str = "agent";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Credential class of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialClass {
    /// Automated agent credential (API key).
    Agent,
    /// Interactive human user.
    User,
}

/// Caller identity for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the agent sentinel or a user UUID.
    pub subject: String,
    /// Raw tenant identifier; must parse as a [`TenantId`].
    pub tenant_id: String,
    /// Assigned role names. Order is irrelevant.
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl Claims {
    /// Builds claims from raw parts.
    #[must_use]
    pub fn new<I, S>(subject: impl Into<String>, tenant_id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject: subject.into(),
            tenant_id: tenant_id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the credential class implied by the subject.
    #[must_use]
    pub fn credential_class(&self) -> CredentialClass {
        if self.subject == AGENT_SUBJECT {
            CredentialClass::Agent
        } else {
            CredentialClass::User
        }
    }

    /// Returns the effective role. Recomputed on every call.
    #[must_use]
    pub fn effective_role(&self) -> Role {
        Role::resolve(&self.roles)
    }

    /// Parses the tenant identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TenantIdError`] when the tenant id is malformed.
    pub fn parse_tenant_id(&self) -> Result<TenantId, TenantIdError> {
        TenantId::parse(&self.tenant_id)
    }

    /// Returns the actor id used to attribute writes.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimsError::InvalidSubject`] when a non-agent subject is not
    /// a UUID.
    pub fn actor_id(&self) -> Result<ActorId, ClaimsError> {
        match self.credential_class() {
            CredentialClass::Agent => Ok(ActorId::agent()),
            CredentialClass::User => Uuid::parse_str(self.subject.trim())
                .map(ActorId::user)
                .map_err(|_| ClaimsError::InvalidSubject(self.subject.clone())),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Claims interpretation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsError {
    /// Subject is neither the agent sentinel nor a user UUID.
    #[error("subject is not a valid user id: {0}")]
    InvalidSubject(String),
}
