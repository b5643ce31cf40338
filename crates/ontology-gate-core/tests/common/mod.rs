// crates/ontology-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Fixtures
// Description: Shared claims, tenant, and store fixtures for core tests.
// Purpose: Keep integration suites focused on behavior, not setup.
// ============================================================================

#![allow(dead_code, reason = "Each suite uses a different subset of fixtures.")]

use ontology_gate_core::ActorId;
use ontology_gate_core::Claims;
use ontology_gate_core::Provenance;
use ontology_gate_core::RecordHeader;
use ontology_gate_core::SourceLabel;
use ontology_gate_core::TenantId;
use ontology_gate_core::Timestamp;
use ontology_gate_core::WriteScope;

pub const TENANT: &str = "3b0f8a52-6c0e-4f8e-9a57-0c2f4d1b7e11";
pub const OTHER_TENANT: &str = "9d6c1e27-2a4b-4b7d-8f0e-5e3a6c9d2b44";
pub const USER_SUBJECT: &str = "5a1e7c93-0b2d-4e6f-8a1c-3d5e7f9b1c2d";

pub fn tenant() -> TenantId {
    TenantId::parse(TENANT).unwrap()
}

pub fn user_claims(roles: &[&str]) -> Claims {
    Claims::new(USER_SUBJECT, TENANT, roles.iter().copied())
}

pub fn agent_claims(roles: &[&str]) -> Claims {
    Claims::new("agent", TENANT, roles.iter().copied())
}

pub fn scope_at(millis: i64) -> WriteScope {
    WriteScope {
        tenant_id: tenant(),
        actor: Some(ActorId::agent()),
        now: Timestamp::from_unix_millis(millis),
    }
}

pub fn header(source: Provenance) -> RecordHeader {
    RecordHeader::new(tenant(), SourceLabel::from(source), None, Timestamp::from_unix_millis(1))
}
