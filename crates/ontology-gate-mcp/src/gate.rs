// crates/ontology-gate-mcp/src/gate.rs
// ============================================================================
// Module: Access Gate
// Description: Admission of one operation: auth, tenant scope, capability, feature.
// Purpose: Hand admitted operations a tenant scope and refuse everything else.
// Dependencies: ontology-gate-core, ontology-gate-config, crate::{audit, context, errors, sources, tenant_scope}
// ============================================================================

//! ## Overview
//! Every operation passes through [`AccessGate`] before it touches tenant
//! data. The gate runs these steps in order, each with its own failure:
//!
//! 1. claims present, else `AUTH_REQUIRED`;
//! 2. tenant id parses, else `INVALID_TENANT`;
//! 3. tenant scope acquired, else an internal fault;
//! 4. tool-group state loaded, else an internal fault;
//! 5. capability set computed;
//! 6. operation is a member, else `OPERATION_NOT_ENABLED`;
//! 7. required feature installed, else `FEATURE_NOT_INSTALLED`;
//! 8. grant returned with the scope guard.
//!
//! ## Invariants
//! - A scope acquired in step 3 is released exactly once on every later
//!   failure, and by the grant holder otherwise.
//! - Feature checks fail closed: a checker error denies. No checker means
//!   no feature requirement is enforced.
//! - Internal faults are audited with detail; callers see only a generic error.
//!
//! [`AccessGate::from_config`] wires a gate from `ontology-gate.toml`: the
//! `[store]` section selects the scope provider, `[tool_groups]` and
//! `[features]` back the configuration sources, and `[audit]` selects the
//! sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use ontology_gate_config::OntologyGateConfig;
use ontology_gate_core::CredentialClass;
use ontology_gate_core::TenantId;
use ontology_gate_core::ToolName;
use ontology_gate_core::capabilities;
use ontology_gate_core::required_feature;

use crate::audit::AccessAuditEvent;
use crate::audit::AccessAuditSink;
use crate::audit::FaultAuditEvent;
use crate::audit::sink_from_config;
use crate::context;
use crate::context::RequestContext;
use crate::context::ScopedContext;
use crate::errors::Denial;
use crate::errors::DenialCode;
use crate::errors::GateBuildError;
use crate::errors::GateError;
use crate::sources::ConfigFeatureChecker;
use crate::sources::ConfigToolGroupSource;
use crate::sources::FeatureInstallationChecker;
use crate::sources::ToolGroupSource;
use crate::tenant_scope::ConfiguredScopeProvider;
use crate::tenant_scope::ScopeGuard;
use crate::tenant_scope::TenantScopeProvider;
use crate::tenant_scope::TenantSession;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Gate variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateVariant {
    /// Stamps the acting identity for write attribution.
    Write,
    /// Pure read; no acting identity.
    Read,
}

/// Successful admission.
pub struct GateGrant<S: TenantSession> {
    /// Tenant the operation is bound to.
    pub tenant_id: TenantId,
    /// Scoped context for the operation.
    pub context: ScopedContext,
    /// Tenant scope; release it when the operation ends.
    pub scope: ScopeGuard<S>,
}

impl<S: TenantSession> GateGrant<S> {
    /// Releases the tenant scope.
    pub fn release(self) {
        self.scope.release();
    }
}

/// Inputs required to build an access gate.
pub struct AccessGateConfig<P> {
    /// Tenant scope provider.
    pub scopes: Arc<P>,
    /// Tool-group configuration service.
    pub tool_groups: Arc<dyn ToolGroupSource>,
    /// Optional feature-installation checker.
    pub features: Option<Arc<dyn FeatureInstallationChecker>>,
    /// Audit sink for decisions and faults.
    pub audit: Arc<dyn AccessAuditSink>,
}

/// Access gate for tool operations.
pub struct AccessGate<P> {
    /// Tenant scope provider.
    scopes: Arc<P>,
    /// Tool-group configuration service.
    tool_groups: Arc<dyn ToolGroupSource>,
    /// Optional feature-installation checker.
    features: Option<Arc<dyn FeatureInstallationChecker>>,
    /// Audit sink for decisions and faults.
    audit: Arc<dyn AccessAuditSink>,
}

// ============================================================================
// SECTION: Construction From Config
// ============================================================================

impl AccessGate<ConfiguredScopeProvider> {
    /// Builds a gate from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GateBuildError::Config`] when the configuration is invalid
    /// and [`GateBuildError::Init`] when the store or audit sink cannot be
    /// opened.
    pub fn from_config(config: &OntologyGateConfig) -> Result<Self, GateBuildError> {
        config.validate().map_err(|err| GateBuildError::Config(err.to_string()))?;
        let scopes = ConfiguredScopeProvider::from_config(&config.store)
            .map_err(|err| GateBuildError::Init(err.to_string()))?;
        let audit =
            sink_from_config(&config.audit).map_err(|err| GateBuildError::Init(err.to_string()))?;
        let shared = Arc::new(config.clone());
        Ok(Self::new(AccessGateConfig {
            scopes: Arc::new(scopes),
            tool_groups: Arc::new(ConfigToolGroupSource::new(Arc::clone(&shared))),
            features: Some(Arc::new(ConfigFeatureChecker::new(shared))),
            audit,
        }))
    }
}

// ============================================================================
// SECTION: Gate
// ============================================================================

impl<P: TenantScopeProvider> AccessGate<P> {
    /// Builds a gate.
    #[must_use]
    pub fn new(config: AccessGateConfig<P>) -> Self {
        Self {
            scopes: config.scopes,
            tool_groups: config.tool_groups,
            features: config.features,
            audit: config.audit,
        }
    }

    /// Returns the tenant scope provider.
    #[must_use]
    pub const fn scopes(&self) -> &Arc<P> {
        &self.scopes
    }

    /// Returns the audit sink.
    #[must_use]
    pub const fn audit(&self) -> &Arc<dyn AccessAuditSink> {
        &self.audit
    }

    /// Admits an operation that writes, stamping the acting identity.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Denied`] for caller-actionable refusals and
    /// [`GateError::Internal`] for infrastructure faults.
    pub async fn acquire_for_write(
        &self,
        ctx: &RequestContext,
        tool: ToolName,
    ) -> Result<GateGrant<P::Session>, GateError> {
        self.acquire(ctx, tool, GateVariant::Write).await
    }

    /// Admits a read-only operation.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Denied`] for caller-actionable refusals and
    /// [`GateError::Internal`] for infrastructure faults.
    pub async fn acquire_for_read(
        &self,
        ctx: &RequestContext,
        tool: ToolName,
    ) -> Result<GateGrant<P::Session>, GateError> {
        self.acquire(ctx, tool, GateVariant::Read).await
    }

    /// Runs the admission steps shared by both variants.
    async fn acquire(
        &self,
        ctx: &RequestContext,
        tool: ToolName,
        variant: GateVariant,
    ) -> Result<GateGrant<P::Session>, GateError> {
        let Some(claims) = context::extract(ctx) else {
            return Err(self.deny(
                ctx,
                tool,
                None,
                None,
                Denial::new(DenialCode::AuthRequired, "authentication required"),
            ));
        };
        let class = claims.credential_class();
        let actor = match variant {
            GateVariant::Read => None,
            GateVariant::Write => Some(claims.actor_id().map_err(|err| {
                self.deny(
                    ctx,
                    tool,
                    None,
                    Some(class),
                    Denial::new(DenialCode::AuthRequired, err.to_string()),
                )
            })?),
        };

        let tenant_id = claims.parse_tenant_id().map_err(|err| {
            self.deny(ctx, tool, None, Some(class), Denial::new(DenialCode::InvalidTenant, err.to_string()))
        })?;

        let scope = self
            .scopes
            .with_tenant(tenant_id)
            .await
            .map_err(|err| self.fault(ctx, tool, tenant_id, "tenant_scope", err.to_string()))?;

        let state = match self.tool_groups.tool_groups_state(tenant_id).await {
            Ok(state) => state,
            Err(err) => {
                scope.release();
                return Err(self.fault(ctx, tool, tenant_id, "tool_groups", err.to_string()));
            }
        };

        let granted = capabilities(claims, &state);
        if !granted.contains(tool) {
            scope.release();
            return Err(self.deny(
                ctx,
                tool,
                Some(tenant_id),
                Some(class),
                Denial::new(
                    DenialCode::OperationNotEnabled,
                    format!("tool {tool} is not enabled for this caller"),
                ),
            ));
        }

        if let Some(feature) = required_feature(tool, class)
            && let Some(checker) = &self.features
        {
            let installed = checker.is_installed(tenant_id, feature).await.unwrap_or_else(|err| {
                self.audit.record_fault(&FaultAuditEvent::new(
                    ctx.request_id.clone(),
                    Some(tool),
                    Some(tenant_id),
                    "feature_check",
                    err.to_string(),
                ));
                false
            });
            if !installed {
                scope.release();
                return Err(self.deny(
                    ctx,
                    tool,
                    Some(tenant_id),
                    Some(class),
                    Denial::new(
                        DenialCode::FeatureNotInstalled,
                        format!("tool {tool} requires the {} feature to be installed", feature.as_str()),
                    ),
                ));
            }
        }

        self.audit.record_access(&AccessAuditEvent::new(
            ctx.request_id.clone(),
            Some(tool),
            Some(tenant_id),
            Some(class),
            None,
        ));
        Ok(GateGrant {
            tenant_id,
            context: ScopedContext {
                tenant_id,
                credential_class: class,
                role: claims.effective_role(),
                actor,
                request_id: ctx.request_id.clone(),
            },
            scope,
        })
    }

    /// Audits a refusal and wraps it.
    fn deny(
        &self,
        ctx: &RequestContext,
        tool: ToolName,
        tenant_id: Option<TenantId>,
        class: Option<CredentialClass>,
        denial: Denial,
    ) -> GateError {
        self.audit.record_access(&AccessAuditEvent::new(
            ctx.request_id.clone(),
            Some(tool),
            tenant_id,
            class,
            Some(denial.code),
        ));
        GateError::Denied(denial)
    }

    /// Audits an infrastructure fault and wraps it.
    fn fault(
        &self,
        ctx: &RequestContext,
        tool: ToolName,
        tenant_id: TenantId,
        stage: &'static str,
        detail: String,
    ) -> GateError {
        self.audit.record_fault(&FaultAuditEvent::new(
            ctx.request_id.clone(),
            Some(tool),
            Some(tenant_id),
            stage,
            detail.clone(),
        ));
        GateError::Internal(format!("{stage}: {detail}"))
    }
}
