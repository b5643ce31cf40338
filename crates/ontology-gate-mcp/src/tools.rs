// crates/ontology-gate-mcp/src/tools.rs
// ============================================================================
// Module: Tool Router
// Description: Dispatches tool calls through the access gate to their handlers.
// Purpose: Wire admitted maintenance tools to the precedence-checked write path.
// Dependencies: ontology-gate-core, ontology-gate-config, async-trait, serde, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`ToolRouter`] parses the tool name, admits the call through the
//! [`AccessGate`], and runs the handler. Ontology maintenance tools write as
//! the `mcp` actor through [`upsert_record`] and [`delete_record`] on a
//! blocking thread that owns the tenant scope. Schema and query tools are
//! handed to a [`ToolDelegate`]; the default delegate reports them as
//! unsupported.
//!
//! ## Invariants
//! - Every handler receives its tenant scope from the gate and releases it
//!   before returning, including when the request payload is rejected.
//! - Infrastructure faults are audited with detail and returned as
//!   [`ToolError::Internal`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use ontology_gate_config::OntologyGateConfig;
use ontology_gate_core::ColumnKey;
use ontology_gate_core::ColumnMetadata;
use ontology_gate_core::ColumnPatch;
use ontology_gate_core::EntityRelationship;
use ontology_gate_core::FactKey;
use ontology_gate_core::GlossaryTerm;
use ontology_gate_core::GlossaryTermPatch;
use ontology_gate_core::KnowledgeFact;
use ontology_gate_core::KnowledgeFactPatch;
use ontology_gate_core::MetadataRecord;
use ontology_gate_core::MetadataStore;
use ontology_gate_core::Provenance;
use ontology_gate_core::RelationshipKey;
use ontology_gate_core::RelationshipPatch;
use ontology_gate_core::StoreError;
use ontology_gate_core::TableKey;
use ontology_gate_core::TableMetadata;
use ontology_gate_core::TablePatch;
use ontology_gate_core::TenantId;
use ontology_gate_core::TermKey;
use ontology_gate_core::Timestamp;
use ontology_gate_core::ToolName;
use ontology_gate_core::WriteError;
use ontology_gate_core::WriteScope;
use ontology_gate_core::delete_record;
use ontology_gate_core::natural_key_string;
use ontology_gate_core::upsert_record;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;

use crate::audit::AccessAuditSink;
use crate::audit::FaultAuditEvent;
use crate::audit::WriteAuditEvent;
use crate::audit::WriteOutcome;
use crate::context::RequestContext;
use crate::context::ScopedContext;
use crate::errors::Denial;
use crate::errors::DenialCode;
use crate::errors::GateBuildError;
use crate::errors::ToolError;
use crate::gate::AccessGate;
use crate::gate::GateGrant;
use crate::tenant_scope::ConfiguredScopeProvider;
use crate::tenant_scope::MetadataSession;
use crate::tenant_scope::TenantScopeProvider;

// ============================================================================
// SECTION: Delegate
// ============================================================================

/// Handler for tools whose behavior lives outside this crate.
#[async_trait]
pub trait ToolDelegate: Send + Sync {
    /// Runs an admitted tool call.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the tool fails or is not supported.
    async fn call(
        &self,
        context: &ScopedContext,
        tool: ToolName,
        payload: Value,
    ) -> Result<Value, ToolError>;
}

/// Delegate that supports nothing.
pub struct UnsupportedToolDelegate;

#[async_trait]
impl ToolDelegate for UnsupportedToolDelegate {
    async fn call(
        &self,
        _context: &ScopedContext,
        tool: ToolName,
        _payload: Value,
    ) -> Result<Value, ToolError> {
        Err(ToolError::Unsupported(tool))
    }
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Decoded payload of an update tool.
pub trait UpsertRequest: DeserializeOwned {
    /// Record kind written by the tool.
    type Record: MetadataRecord;

    /// Splits the request into natural key and patch.
    fn into_parts(
        self,
    ) -> (<Self::Record as MetadataRecord>::Key, <Self::Record as MetadataRecord>::Patch);
}

/// Decoded payload of a delete tool.
pub trait DeleteRequest: DeserializeOwned {
    /// Record kind removed by the tool.
    type Record: MetadataRecord;

    /// Returns the natural key to delete.
    fn into_key(self) -> <Self::Record as MetadataRecord>::Key;
}

/// `update_table` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTableRequest {
    /// Table name.
    pub table_name: String,
    /// Business description.
    pub description: Option<String>,
    /// Usage guidance.
    pub usage_notes: Option<String>,
    /// Marks transient/staging tables.
    pub is_ephemeral: Option<bool>,
    /// Table to use instead of this one.
    pub preferred_alternative: Option<String>,
}

impl UpsertRequest for UpdateTableRequest {
    type Record = TableMetadata;

    fn into_parts(self) -> (TableKey, TablePatch) {
        (
            TableKey::new(self.table_name),
            TablePatch {
                description: self.description,
                usage_notes: self.usage_notes,
                is_ephemeral: self.is_ephemeral,
                preferred_alternative: self.preferred_alternative,
            },
        )
    }
}

/// `delete_table_metadata` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteTableRequest {
    /// Table name.
    pub table_name: String,
}

impl DeleteRequest for DeleteTableRequest {
    type Record = TableMetadata;

    fn into_key(self) -> TableKey {
        TableKey::new(self.table_name)
    }
}

/// `update_column` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateColumnRequest {
    /// Owning table name.
    pub table_name: String,
    /// Column name.
    pub column_name: String,
    /// Business description.
    pub description: Option<String>,
    /// Semantic type.
    pub semantic_type: Option<String>,
    /// Analytical role.
    pub role: Option<String>,
    /// Known enumerated values.
    pub enum_values: Option<Vec<String>>,
    /// Marks columns holding sensitive data.
    pub is_sensitive: Option<bool>,
}

impl UpsertRequest for UpdateColumnRequest {
    type Record = ColumnMetadata;

    fn into_parts(self) -> (ColumnKey, ColumnPatch) {
        (
            ColumnKey::new(self.table_name, self.column_name),
            ColumnPatch {
                description: self.description,
                semantic_type: self.semantic_type,
                role: self.role,
                enum_values: self.enum_values,
                is_sensitive: self.is_sensitive,
            },
        )
    }
}

/// `delete_column_metadata` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteColumnRequest {
    /// Owning table name.
    pub table_name: String,
    /// Column name.
    pub column_name: String,
}

impl DeleteRequest for DeleteColumnRequest {
    type Record = ColumnMetadata;

    fn into_key(self) -> ColumnKey {
        ColumnKey::new(self.table_name, self.column_name)
    }
}

/// `update_relationship` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRelationshipRequest {
    /// Source entity.
    pub from_entity: String,
    /// Target entity.
    pub to_entity: String,
    /// Business description.
    pub description: Option<String>,
    /// Short verb phrase such as `places`.
    pub label: Option<String>,
    /// Cardinality such as `1:N`.
    pub cardinality: Option<String>,
    /// Join column on the source side.
    pub from_column: Option<String>,
    /// Join column on the target side.
    pub to_column: Option<String>,
}

impl UpsertRequest for UpdateRelationshipRequest {
    type Record = EntityRelationship;

    fn into_parts(self) -> (RelationshipKey, RelationshipPatch) {
        (
            RelationshipKey::new(self.from_entity, self.to_entity),
            RelationshipPatch {
                description: self.description,
                label: self.label,
                cardinality: self.cardinality,
                from_column: self.from_column,
                to_column: self.to_column,
            },
        )
    }
}

/// `delete_relationship` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteRelationshipRequest {
    /// Source entity.
    pub from_entity: String,
    /// Target entity.
    pub to_entity: String,
}

impl DeleteRequest for DeleteRelationshipRequest {
    type Record = EntityRelationship;

    fn into_key(self) -> RelationshipKey {
        RelationshipKey::new(self.from_entity, self.to_entity)
    }
}

/// `update_glossary_term` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateGlossaryTermRequest {
    /// Business term.
    pub term: String,
    /// Definition; required when the term is new.
    pub definition: Option<String>,
    /// SQL that computes the term.
    pub defining_sql: Option<String>,
    /// Alternative names.
    pub aliases: Option<Vec<String>>,
    /// Table the term is computed from.
    pub base_table: Option<String>,
}

impl UpsertRequest for UpdateGlossaryTermRequest {
    type Record = GlossaryTerm;

    fn into_parts(self) -> (TermKey, GlossaryTermPatch) {
        (
            TermKey::new(self.term),
            GlossaryTermPatch {
                definition: self.definition,
                defining_sql: self.defining_sql,
                aliases: self.aliases,
                base_table: self.base_table,
            },
        )
    }
}

/// `delete_glossary_term` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteGlossaryTermRequest {
    /// Business term.
    pub term: String,
}

impl DeleteRequest for DeleteGlossaryTermRequest {
    type Record = GlossaryTerm;

    fn into_key(self) -> TermKey {
        TermKey::new(self.term)
    }
}

/// `update_project_knowledge` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProjectKnowledgeRequest {
    /// Topic the fact is filed under.
    pub topic: String,
    /// Fact text; required when the topic is new.
    pub fact: Option<String>,
    /// Where the fact came from.
    pub context: Option<String>,
    /// Free-form category.
    pub category: Option<String>,
}

impl UpsertRequest for UpdateProjectKnowledgeRequest {
    type Record = KnowledgeFact;

    fn into_parts(self) -> (FactKey, KnowledgeFactPatch) {
        (
            FactKey::new(self.topic),
            KnowledgeFactPatch {
                fact: self.fact,
                context: self.context,
                category: self.category,
            },
        )
    }
}

/// `delete_project_knowledge` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteProjectKnowledgeRequest {
    /// Topic the fact is filed under.
    pub topic: String,
}

impl DeleteRequest for DeleteProjectKnowledgeRequest {
    type Record = KnowledgeFact;

    fn into_key(self) -> FactKey {
        FactKey::new(self.topic)
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Update tool response.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertResponse<T> {
    /// True when the record did not exist before.
    pub created: bool,
    /// Record as persisted.
    pub record: T,
}

/// Delete tool response.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeleteResponse {
    /// True when a live record was removed.
    pub deleted: bool,
}

/// `get_ontology` response.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OntologySnapshot {
    /// Table metadata.
    pub tables: Vec<TableMetadata>,
    /// Column metadata.
    pub columns: Vec<ColumnMetadata>,
    /// Entity relationships.
    pub relationships: Vec<EntityRelationship>,
    /// Glossary terms.
    pub glossary_terms: Vec<GlossaryTerm>,
    /// Project knowledge facts.
    pub knowledge_facts: Vec<KnowledgeFact>,
}

// ============================================================================
// SECTION: Tool Router
// ============================================================================

/// Tool router for MCP requests.
pub struct ToolRouter<P> {
    /// Access gate shared by every tool.
    gate: Arc<AccessGate<P>>,
    /// Handler for schema and query tools.
    delegate: Arc<dyn ToolDelegate>,
}

impl<P> Clone for ToolRouter<P> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            delegate: Arc::clone(&self.delegate),
        }
    }
}

impl ToolRouter<ConfiguredScopeProvider> {
    /// Builds a router over a gate wired from `ontology-gate.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`GateBuildError`] when the gate cannot be built.
    pub fn from_config(config: &OntologyGateConfig) -> Result<Self, GateBuildError> {
        Ok(Self::new(AccessGate::from_config(config)?))
    }
}

impl<P: TenantScopeProvider + 'static> ToolRouter<P> {
    /// Creates a router whose delegated tools are unsupported.
    #[must_use]
    pub fn new(gate: AccessGate<P>) -> Self {
        Self::with_delegate(gate, Arc::new(UnsupportedToolDelegate))
    }

    /// Creates a router with a delegate for schema and query tools.
    #[must_use]
    pub fn with_delegate(gate: AccessGate<P>, delegate: Arc<dyn ToolDelegate>) -> Self {
        Self {
            gate: Arc::new(gate),
            delegate,
        }
    }

    /// Returns the access gate.
    #[must_use]
    pub fn gate(&self) -> &AccessGate<P> {
        &self.gate
    }

    /// Handles a tool call by name with JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the call is refused or fails.
    pub async fn handle_tool_call(
        &self,
        ctx: &RequestContext,
        name: &str,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let Some(tool) = ToolName::parse(name) else {
            return Err(ToolError::Denied(Denial::new(
                DenialCode::UnknownOperation,
                format!("unknown tool: {name}"),
            )));
        };
        match tool {
            ToolName::Health => self.handle_health(ctx).await,
            ToolName::Echo => self.handle_echo(ctx, payload).await,
            ToolName::GetOntology => self.handle_get_ontology(ctx).await,
            ToolName::UpdateTable => self.handle_upsert::<UpdateTableRequest>(ctx, tool, payload).await,
            ToolName::DeleteTableMetadata => {
                self.handle_delete::<DeleteTableRequest>(ctx, tool, payload).await
            }
            ToolName::UpdateColumn => {
                self.handle_upsert::<UpdateColumnRequest>(ctx, tool, payload).await
            }
            ToolName::DeleteColumnMetadata => {
                self.handle_delete::<DeleteColumnRequest>(ctx, tool, payload).await
            }
            ToolName::UpdateRelationship => {
                self.handle_upsert::<UpdateRelationshipRequest>(ctx, tool, payload).await
            }
            ToolName::DeleteRelationship => {
                self.handle_delete::<DeleteRelationshipRequest>(ctx, tool, payload).await
            }
            ToolName::UpdateGlossaryTerm => {
                self.handle_upsert::<UpdateGlossaryTermRequest>(ctx, tool, payload).await
            }
            ToolName::DeleteGlossaryTerm => {
                self.handle_delete::<DeleteGlossaryTermRequest>(ctx, tool, payload).await
            }
            ToolName::UpdateProjectKnowledge => {
                self.handle_upsert::<UpdateProjectKnowledgeRequest>(ctx, tool, payload).await
            }
            ToolName::DeleteProjectKnowledge => {
                self.handle_delete::<DeleteProjectKnowledgeRequest>(ctx, tool, payload).await
            }
            ToolName::GetSchema
            | ToolName::GetContext
            | ToolName::Query
            | ToolName::Sample
            | ToolName::Validate
            | ToolName::ExplainQuery
            | ToolName::ListApprovedQueries
            | ToolName::ExecuteApprovedQuery => self.handle_delegated(ctx, tool, payload).await,
        }
    }

    /// Handles `health`.
    async fn handle_health(&self, ctx: &RequestContext) -> Result<Value, ToolError> {
        let grant = self.gate.acquire_for_read(ctx, ToolName::Health).await?;
        let response = json!({
            "status": "ok",
            "tenant_id": grant.tenant_id,
            "role": grant.context.role,
        });
        grant.release();
        Ok(response)
    }

    /// Handles `echo`.
    async fn handle_echo(&self, ctx: &RequestContext, payload: Value) -> Result<Value, ToolError> {
        let grant = self.gate.acquire_for_read(ctx, ToolName::Echo).await?;
        grant.release();
        Ok(json!({ "echo": payload }))
    }

    /// Handles `get_ontology`.
    async fn handle_get_ontology(&self, ctx: &RequestContext) -> Result<Value, ToolError> {
        let tool = ToolName::GetOntology;
        let grant = self.gate.acquire_for_read(ctx, tool).await?;
        let tenant_id = grant.tenant_id;
        let request_id = grant.context.request_id.clone();
        let mut scope = grant.scope;
        let snapshot = tokio::task::spawn_blocking(move || {
            let result = match scope.session_mut() {
                Some(session) => load_snapshot(session, &tenant_id),
                None => Err(released_scope()),
            };
            scope.release();
            result
        })
        .await
        .map_err(|err| ToolError::Internal(format!("{tool} join failed: {err}")))
        .and_then(|result| result.map_err(|err| ToolError::Internal(err.to_string())))
        .map_err(|err| self.audit_fault(request_id, tool, tenant_id, err))?;
        serde_json::to_value(snapshot).map_err(|_| ToolError::Serialization)
    }

    /// Handles an update tool as the `mcp` actor.
    async fn handle_upsert<R>(
        &self,
        ctx: &RequestContext,
        tool: ToolName,
        payload: Value,
    ) -> Result<Value, ToolError>
    where
        R: UpsertRequest,
        P::Session: MetadataStore<R::Record>,
    {
        let grant = self.gate.acquire_for_write(ctx, tool).await?;
        let request = decode::<R>(payload)?;
        let (key, patch) = request.into_parts();
        let key = <R::Record as MetadataRecord>::normalize_key(key.clone()).unwrap_or(key);
        let natural_key = natural_key_string::<R::Record>(&key).unwrap_or_default();
        let GateGrant {
            tenant_id,
            context,
            mut scope,
        } = grant;
        let write_scope = WriteScope {
            tenant_id,
            actor: context.actor,
            now: current_timestamp(),
        };
        let result = tokio::task::spawn_blocking(move || {
            let outcome = match scope.session_mut() {
                Some(session) => upsert_record::<R::Record, _>(
                    session,
                    &write_scope,
                    key,
                    Provenance::Mcp,
                    patch,
                ),
                None => Err(WriteError::Store(released_scope())),
            };
            scope.release();
            outcome
        })
        .await
        .map_err(|err| ToolError::Internal(format!("{tool} join failed: {err}")))?;

        let audit = |outcome| {
            self.audit().record_write(&WriteAuditEvent::new(
                context.request_id.clone(),
                tenant_id,
                <R::Record as MetadataRecord>::KIND,
                natural_key.clone(),
                outcome,
            ));
        };
        match result {
            Ok(outcome) => {
                audit(if outcome.created { WriteOutcome::Created } else { WriteOutcome::Updated });
                serde_json::to_value(UpsertResponse {
                    created: outcome.created,
                    record: outcome.record,
                })
                .map_err(|_| ToolError::Serialization)
            }
            Err(err) => {
                if matches!(err, WriteError::PrecedenceBlocked(_)) {
                    audit(WriteOutcome::Blocked);
                }
                Err(self.audit_fault(context.request_id.clone(), tool, tenant_id, err.into()))
            }
        }
    }

    /// Handles a delete tool.
    async fn handle_delete<R>(
        &self,
        ctx: &RequestContext,
        tool: ToolName,
        payload: Value,
    ) -> Result<Value, ToolError>
    where
        R: DeleteRequest,
        P::Session: MetadataStore<R::Record>,
    {
        let grant = self.gate.acquire_for_write(ctx, tool).await?;
        let key = decode::<R>(payload)?.into_key();
        let key = <R::Record as MetadataRecord>::normalize_key(key.clone()).unwrap_or(key);
        let natural_key = natural_key_string::<R::Record>(&key).unwrap_or_default();
        let GateGrant {
            tenant_id,
            context,
            mut scope,
        } = grant;
        let write_scope = WriteScope {
            tenant_id,
            actor: context.actor,
            now: current_timestamp(),
        };
        let result = tokio::task::spawn_blocking(move || {
            let outcome = match scope.session_mut() {
                Some(session) => {
                    delete_record::<R::Record, _>(session, &write_scope, key, Provenance::Mcp)
                }
                None => Err(WriteError::Store(released_scope())),
            };
            scope.release();
            outcome
        })
        .await
        .map_err(|err| ToolError::Internal(format!("{tool} join failed: {err}")))?;

        let audit = |outcome| {
            self.audit().record_write(&WriteAuditEvent::new(
                context.request_id.clone(),
                tenant_id,
                <R::Record as MetadataRecord>::KIND,
                natural_key.clone(),
                outcome,
            ));
        };
        match result {
            Ok(outcome) => {
                audit(if outcome.deleted { WriteOutcome::Deleted } else { WriteOutcome::Absent });
                serde_json::to_value(DeleteResponse {
                    deleted: outcome.deleted,
                })
                .map_err(|_| ToolError::Serialization)
            }
            Err(err) => {
                if matches!(err, WriteError::PrecedenceBlocked(_)) {
                    audit(WriteOutcome::Blocked);
                }
                Err(self.audit_fault(context.request_id.clone(), tool, tenant_id, err.into()))
            }
        }
    }

    /// Hands an admitted call to the delegate.
    async fn handle_delegated(
        &self,
        ctx: &RequestContext,
        tool: ToolName,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let grant = self.gate.acquire_for_read(ctx, tool).await?;
        let result = self.delegate.call(&grant.context, tool, payload).await;
        let tenant_id = grant.tenant_id;
        let request_id = grant.context.request_id.clone();
        grant.release();
        result.map_err(|err| self.audit_fault(request_id, tool, tenant_id, err))
    }

    /// Returns the audit sink.
    fn audit(&self) -> &Arc<dyn AccessAuditSink> {
        self.gate.audit()
    }

    /// Audits internal faults; denials pass through untouched.
    fn audit_fault(
        &self,
        request_id: Option<String>,
        tool: ToolName,
        tenant_id: TenantId,
        error: ToolError,
    ) -> ToolError {
        if let ToolError::Internal(detail) = &error {
            self.audit().record_fault(&FaultAuditEvent::new(
                request_id,
                Some(tool),
                Some(tenant_id),
                "tool_handler",
                detail.clone(),
            ));
        }
        error
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a tool payload.
fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, ToolError> {
    serde_json::from_value(payload).map_err(|err| ToolError::invalid_input(err.to_string()))
}

/// Lists every record kind for the tenant.
fn load_snapshot<S: MetadataSession>(
    session: &mut S,
    tenant_id: &TenantId,
) -> Result<OntologySnapshot, StoreError> {
    Ok(OntologySnapshot {
        tables: MetadataStore::<TableMetadata>::list(session, tenant_id)?,
        columns: MetadataStore::<ColumnMetadata>::list(session, tenant_id)?,
        relationships: MetadataStore::<EntityRelationship>::list(session, tenant_id)?,
        glossary_terms: MetadataStore::<GlossaryTerm>::list(session, tenant_id)?,
        knowledge_facts: MetadataStore::<KnowledgeFact>::list(session, tenant_id)?,
    })
}

/// Error for a scope that was released before use.
fn released_scope() -> StoreError {
    StoreError::Invalid("tenant scope already released".to_string())
}

/// Returns the current wall-clock time.
fn current_timestamp() -> Timestamp {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    Timestamp::from_unix_millis(i64::try_from(millis).unwrap_or(i64::MAX))
}
