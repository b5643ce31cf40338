// crates/ontology-gate-mcp/src/audit.rs
// ============================================================================
// Module: Access Audit Logging
// Description: Structured audit events for gate decisions and metadata writes.
// Purpose: Emit JSON-line audit records without a logging framework.
// Dependencies: ontology-gate-core, ontology-gate-config, serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events are serialized as one JSON object per line. Sinks write to
//! stderr, append to a file, or discard. Fault events carry full internal
//! detail and must never be routed back to callers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use ontology_gate_config::AuditConfig;
use ontology_gate_core::CredentialClass;
use ontology_gate_core::RecordKind;
use ontology_gate_core::TenantId;
use ontology_gate_core::ToolName;
use serde::Serialize;

use crate::errors::DenialCode;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Gate decision outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// Operation admitted.
    Allow,
    /// Operation refused.
    Deny,
}

/// Write outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    /// New record created.
    Created,
    /// Existing record updated.
    Updated,
    /// Precedence arbiter refused the update.
    Blocked,
    /// Record removed.
    Deleted,
    /// Delete found nothing to remove.
    Absent,
}

/// Access gate audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AccessAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Operation requested.
    pub tool: Option<ToolName>,
    /// Tenant identifier when it parsed.
    pub tenant_id: Option<TenantId>,
    /// Caller credential class when authenticated.
    pub credential_class: Option<CredentialClass>,
    /// Decision outcome.
    pub decision: AccessDecision,
    /// Denial code for deny events.
    pub code: Option<DenialCode>,
}

/// Metadata write audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct WriteAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Tenant the write was bound to.
    pub tenant_id: TenantId,
    /// Record kind written.
    pub kind: RecordKind,
    /// Canonical natural key.
    pub natural_key: String,
    /// Write outcome.
    pub outcome: WriteOutcome,
}

/// Infrastructure fault audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct FaultAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Operation in flight.
    pub tool: Option<ToolName>,
    /// Tenant identifier when known.
    pub tenant_id: Option<TenantId>,
    /// Stage that failed.
    pub stage: &'static str,
    /// Full internal detail.
    pub detail: String,
}

impl AccessAuditEvent {
    /// Creates an access event with a consistent timestamp.
    #[must_use]
    pub fn new(
        request_id: Option<String>,
        tool: Option<ToolName>,
        tenant_id: Option<TenantId>,
        credential_class: Option<CredentialClass>,
        code: Option<DenialCode>,
    ) -> Self {
        Self {
            event: "access_decision",
            timestamp_ms: timestamp_ms(),
            request_id,
            tool,
            tenant_id,
            credential_class,
            decision: if code.is_some() { AccessDecision::Deny } else { AccessDecision::Allow },
            code,
        }
    }
}

impl WriteAuditEvent {
    /// Creates a write event with a consistent timestamp.
    #[must_use]
    pub fn new(
        request_id: Option<String>,
        tenant_id: TenantId,
        kind: RecordKind,
        natural_key: String,
        outcome: WriteOutcome,
    ) -> Self {
        Self {
            event: "metadata_write",
            timestamp_ms: timestamp_ms(),
            request_id,
            tenant_id,
            kind,
            natural_key,
            outcome,
        }
    }
}

impl FaultAuditEvent {
    /// Creates a fault event with a consistent timestamp.
    #[must_use]
    pub fn new(
        request_id: Option<String>,
        tool: Option<ToolName>,
        tenant_id: Option<TenantId>,
        stage: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            event: "access_fault",
            timestamp_ms: timestamp_ms(),
            request_id,
            tool,
            tenant_id,
            stage,
            detail: detail.into(),
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for gate and write events.
pub trait AccessAuditSink: Send + Sync {
    /// Record a gate decision.
    fn record_access(&self, event: &AccessAuditEvent);

    /// Record a metadata write.
    fn record_write(&self, _event: &WriteAuditEvent) {}

    /// Record an infrastructure fault.
    fn record_fault(&self, _event: &FaultAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAccessAuditSink;

impl StderrAccessAuditSink {
    /// Writes one serialized event.
    fn emit<T: Serialize>(event: &T) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

impl AccessAuditSink for StderrAccessAuditSink {
    fn record_access(&self, event: &AccessAuditEvent) {
        Self::emit(event);
    }

    fn record_write(&self, event: &WriteAuditEvent) {
        Self::emit(event);
    }

    fn record_fault(&self, event: &FaultAuditEvent) {
        Self::emit(event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAccessAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAccessAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event.
    fn emit<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AccessAuditSink for FileAccessAuditSink {
    fn record_access(&self, event: &AccessAuditEvent) {
        self.emit(event);
    }

    fn record_write(&self, event: &WriteAuditEvent) {
        self.emit(event);
    }

    fn record_fault(&self, event: &FaultAuditEvent) {
        self.emit(event);
    }
}

/// No-op audit sink for tests.
pub struct NoopAccessAuditSink;

impl AccessAuditSink for NoopAccessAuditSink {
    fn record_access(&self, _event: &AccessAuditEvent) {}
}

/// Builds the sink selected by the audit config.
///
/// # Errors
///
/// Returns an error if the configured audit file cannot be opened.
pub fn sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn AccessAuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopAccessAuditSink));
    }
    match &config.path {
        Some(path) => Ok(Arc::new(FileAccessAuditSink::new(path)?)),
        None => Ok(Arc::new(StderrAccessAuditSink)),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current wall-clock time in milliseconds.
fn timestamp_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

    use ontology_gate_config::AuditConfig;
    use ontology_gate_core::RecordKind;
    use ontology_gate_core::TenantId;
    use serde_json::Value;

    use super::AccessAuditEvent;
    use super::WriteAuditEvent;
    use super::WriteOutcome;
    use super::sink_from_config;
    use crate::errors::DenialCode;

    #[test]
    fn file_sink_appends_one_json_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let config = AuditConfig {
            enabled: true,
            path: Some(path.clone()),
        };
        let tenant = TenantId::parse("3b0f8a52-6c0e-4f8e-9a57-0c2f4d1b7e11").unwrap();

        let sink = sink_from_config(&config).unwrap();
        sink.record_access(&AccessAuditEvent::new(
            None,
            None,
            Some(tenant),
            None,
            Some(DenialCode::InvalidTenant),
        ));
        sink.record_write(&WriteAuditEvent::new(
            Some("req-9".to_string()),
            tenant,
            RecordKind::GlossaryTerm,
            "[\"ARR\"]".to_string(),
            WriteOutcome::Created,
        ));

        let lines: Vec<Value> = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["decision"], "deny");
        assert_eq!(lines[0]["code"], "INVALID_TENANT");
        assert_eq!(lines[1]["kind"], "glossary_term");
        assert_eq!(lines[1]["outcome"], "created");
    }

    #[test]
    fn disabled_audit_ignores_path() {
        let config = AuditConfig {
            enabled: false,
            path: Some("/nonexistent/dir/audit.jsonl".into()),
        };
        assert!(sink_from_config(&config).is_ok());
    }
}
