// crates/ontology-gate-cli/src/reports.rs
// ============================================================================
// Module: CLI Reports
// Description: Capability and precedence reports printed by the CLI.
// Purpose: Explain gate decisions offline from configuration and labels.
// Dependencies: ontology-gate-core, ontology-gate-config, serde, thiserror
// ============================================================================

//! ## Overview
//! Offline explanations of the two decisions the access layer makes: which
//! operations a caller may invoke for a tenant, and whether a modifier may
//! overwrite a record with given provenance labels.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ontology_gate_config::OntologyGateConfig;
use ontology_gate_core::Claims;
use ontology_gate_core::CredentialClass;
use ontology_gate_core::FeatureId;
use ontology_gate_core::PrecedenceDecision;
use ontology_gate_core::Provenance;
use ontology_gate_core::Role;
use ontology_gate_core::SourceLabel;
use ontology_gate_core::TenantId;
use ontology_gate_core::arbitrate;
use ontology_gate_core::capabilities;
use ontology_gate_core::required_feature;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Report input errors.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Tenant id did not parse.
    #[error("invalid tenant id {tenant}: {reason}")]
    InvalidTenant {
        /// Raw tenant input.
        tenant: String,
        /// Parse failure.
        reason: String,
    },
    /// Modifier is not a known provenance.
    #[error("unknown modifier {0}")]
    UnknownModifier(String),
}

// ============================================================================
// SECTION: Capabilities
// ============================================================================

/// Operation blocked only by a missing add-on feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureBlock {
    /// Operation name.
    pub tool: &'static str,
    /// Feature that is not installed.
    pub feature: FeatureId,
}

/// Effective access for one caller and tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilitiesReport {
    /// Tenant the caller is bound to.
    pub tenant_id: TenantId,
    /// Agent or user.
    pub credential_class: CredentialClass,
    /// Effective role; agents ignore role claims.
    pub role: Role,
    /// Permitted operations, sorted by name.
    pub capabilities: Vec<&'static str>,
    /// Permitted operations the gate would still refuse.
    pub feature_blocked: Vec<FeatureBlock>,
}

/// Builds the capability report for a caller.
///
/// # Errors
///
/// Returns [`ReportError::InvalidTenant`] when `tenant` is not a tenant id.
pub fn capabilities_report<I, S>(
    config: &OntologyGateConfig,
    tenant: &str,
    subject: &str,
    roles: I,
) -> Result<CapabilitiesReport, ReportError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let claims = Claims::new(subject, tenant, roles);
    let tenant_id = claims.parse_tenant_id().map_err(|err| ReportError::InvalidTenant {
        tenant: tenant.to_string(),
        reason: err.to_string(),
    })?;
    let class = claims.credential_class();
    let set = capabilities(&claims, &config.tool_groups_for(&tenant_id));

    let mut names: Vec<&'static str> = set.iter().map(|tool| tool.as_str()).collect();
    names.sort_unstable();
    let mut feature_blocked: Vec<FeatureBlock> = set
        .iter()
        .filter_map(|tool| {
            required_feature(tool, class)
                .filter(|feature| !config.is_feature_installed(&tenant_id, *feature))
                .map(|feature| FeatureBlock {
                    tool: tool.as_str(),
                    feature,
                })
        })
        .collect();
    feature_blocked.sort_unstable_by_key(|block| block.tool);

    Ok(CapabilitiesReport {
        tenant_id,
        credential_class: class,
        role: claims.effective_role(),
        capabilities: names,
        feature_blocked,
    })
}

// ============================================================================
// SECTION: Precedence
// ============================================================================

/// Arbitration outcome with its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrecedenceReport {
    /// Persisted creator label.
    pub source: SourceLabel,
    /// Persisted last-edit label, if any.
    pub last_edit_source: Option<SourceLabel>,
    /// Proposed modifier.
    pub modifier: Provenance,
    /// Arbiter decision.
    pub outcome: PrecedenceDecision,
}

/// Arbitrates a modifier against persisted labels.
///
/// # Errors
///
/// Returns [`ReportError::UnknownModifier`] when `modifier` is not
/// `manual`, `mcp`, or `inferred`.
pub fn precedence_report(
    source: &str,
    last_edit_source: Option<&str>,
    modifier: &str,
) -> Result<PrecedenceReport, ReportError> {
    let modifier = Provenance::parse(modifier.trim())
        .ok_or_else(|| ReportError::UnknownModifier(modifier.to_string()))?;
    let source = SourceLabel::new(source);
    let last_edit_source = last_edit_source.map(SourceLabel::new);
    let outcome = arbitrate(&source, last_edit_source.as_ref(), modifier);
    Ok(PrecedenceReport {
        source,
        last_edit_source,
        modifier,
        outcome,
    })
}
