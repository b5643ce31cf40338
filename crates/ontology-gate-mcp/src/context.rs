// crates/ontology-gate-mcp/src/context.rs
// ============================================================================
// Module: Request Context
// Description: Explicit per-request caller context and the scoped context.
// Purpose: Carry transport-supplied claims into the access gate.
// Dependencies: ontology-gate-core
// ============================================================================

//! ## Overview
//! The transport builds one [`RequestContext`] per inbound operation and
//! passes it by reference through the gate and everything it calls. Claims
//! are never recovered from ambient or thread-local state.
//!
//! A successful gate acquisition yields a [`ScopedContext`]: the tenant the
//! operation is bound to plus, for the write variant, the acting identity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ontology_gate_core::ActorId;
use ontology_gate_core::Claims;
use ontology_gate_core::CredentialClass;
use ontology_gate_core::Role;
use ontology_gate_core::TenantId;

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Caller context for one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Claims established by the transport, when authenticated.
    pub claims: Option<Claims>,
    /// Request identifier for audit correlation.
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Builds an unauthenticated context.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Builds a context carrying the given claims.
    #[must_use]
    pub fn authenticated(claims: Claims) -> Self {
        Self {
            claims: Some(claims),
            request_id: None,
        }
    }

    /// Attaches a request identifier.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Returns the caller claims, or `None` when the request is unauthenticated.
#[must_use]
pub const fn extract(ctx: &RequestContext) -> Option<&Claims> {
    ctx.claims.as_ref()
}

// ============================================================================
// SECTION: Scoped Context
// ============================================================================

/// Context handed to an operation after the gate admits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedContext {
    /// Tenant the operation is bound to.
    pub tenant_id: TenantId,
    /// Credential class of the caller.
    pub credential_class: CredentialClass,
    /// Effective role at admission time.
    pub role: Role,
    /// Acting identity; set only by the write variant of the gate.
    pub actor: Option<ActorId>,
    /// Request identifier for audit correlation.
    pub request_id: Option<String>,
}
