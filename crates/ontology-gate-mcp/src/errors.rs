// crates/ontology-gate-mcp/src/errors.rs
// ============================================================================
// Module: Denials and Tool Errors
// Description: Caller-actionable denials and infrastructure faults.
// Purpose: Keep actionable reasons inspectable and infrastructure detail private.
// Dependencies: ontology-gate-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`Denial`] is something the caller can act on: it carries a stable
//! [`DenialCode`] and a human-readable message and serializes as
//! `{"error": true, "code": "...", "message": "..."}`. Infrastructure faults
//! travel as [`GateError::Internal`] or [`ToolError::Internal`]; their detail
//! goes to the audit sink and the caller only ever sees `"internal error"`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use ontology_gate_core::ToolName;
use ontology_gate_core::WriteError;
use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeStruct;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Message shown to callers for every infrastructure fault.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

// ============================================================================
// SECTION: Denial Codes
// ============================================================================

/// Stable machine-readable denial codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialCode {
    /// No authenticated claims on the request.
    AuthRequired,
    /// Tenant identifier in the claims is malformed.
    InvalidTenant,
    /// Operation is outside the caller's capability set.
    OperationNotEnabled,
    /// Required tenant add-on is not installed or could not be verified.
    FeatureNotInstalled,
    /// Existing record outranks the modifier.
    PrecedenceBlocked,
    /// Request payload failed validation.
    InvalidInput,
    /// Record kept changing underneath the write.
    ConcurrentModification,
    /// Operation name is not recognized.
    UnknownOperation,
}

impl DenialCode {
    /// Returns the wire string for the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::InvalidTenant => "INVALID_TENANT",
            Self::OperationNotEnabled => "OPERATION_NOT_ENABLED",
            Self::FeatureNotInstalled => "FEATURE_NOT_INSTALLED",
            Self::PrecedenceBlocked => "PRECEDENCE_BLOCKED",
            Self::InvalidInput => "INVALID_INPUT",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::UnknownOperation => "UNKNOWN_OPERATION",
        }
    }

    /// Returns every code in declaration order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AuthRequired,
            Self::InvalidTenant,
            Self::OperationNotEnabled,
            Self::FeatureNotInstalled,
            Self::PrecedenceBlocked,
            Self::InvalidInput,
            Self::ConcurrentModification,
            Self::UnknownOperation,
        ]
    }
}

impl fmt::Display for DenialCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Denial
// ============================================================================

/// Caller-actionable refusal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct Denial {
    /// Stable code.
    pub code: DenialCode,
    /// Human-readable reason.
    pub message: String,
}

impl Denial {
    /// Builds a denial.
    #[must_use]
    pub fn new(code: DenialCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Returns the denial as its JSON wire value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({
            "error": true,
            "code": self.code.as_str(),
            "message": self.message,
        })
    }
}

impl Serialize for Denial {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Denial", 3)?;
        state.serialize_field("error", &true)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", &self.message)?;
        state.end()
    }
}

// ============================================================================
// SECTION: Gate Errors
// ============================================================================

/// Access gate failures.
#[derive(Debug, Error)]
pub enum GateError {
    /// Caller-actionable refusal.
    #[error(transparent)]
    Denied(Denial),
    /// Infrastructure fault; detail is internal only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GateError {
    /// Returns the denial when the failure is caller-actionable.
    #[must_use]
    pub const fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Denied(denial) => Some(denial),
            Self::Internal(_) => None,
        }
    }
}

/// Failures building a gate from `ontology-gate.toml`.
#[derive(Debug, Error)]
pub enum GateBuildError {
    /// Configuration failed validation.
    #[error("gate config invalid: {0}")]
    Config(String),
    /// Store or audit sink could not be opened.
    #[error("gate initialization failed: {0}")]
    Init(String),
}

// ============================================================================
// SECTION: Tool Errors
// ============================================================================

/// Tool routing failures.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Caller-actionable refusal.
    #[error(transparent)]
    Denied(Denial),
    /// Tool is known but has no handler in this deployment.
    #[error("tool not supported: {0}")]
    Unsupported(ToolName),
    /// Response could not be serialized.
    #[error("serialization failure")]
    Serialization,
    /// Infrastructure fault; detail is internal only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Builds an `INVALID_INPUT` denial.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::Denied(Denial::new(DenialCode::InvalidInput, message))
    }

    /// Returns the denial when the failure is caller-actionable.
    #[must_use]
    pub const fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Denied(denial) => Some(denial),
            Self::Unsupported(_) | Self::Serialization | Self::Internal(_) => None,
        }
    }

    /// Returns the message safe to show the caller.
    #[must_use]
    pub fn caller_message(&self) -> String {
        match self {
            Self::Denied(denial) => denial.message.clone(),
            Self::Unsupported(tool) => format!("tool {tool} is not supported"),
            Self::Serialization | Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Returns the JSON error payload sent to the caller.
    #[must_use]
    pub fn to_response(&self) -> Value {
        match self {
            Self::Denied(denial) => denial.to_value(),
            Self::Unsupported(_) | Self::Serialization | Self::Internal(_) => json!({
                "error": true,
                "message": self.caller_message(),
            }),
        }
    }
}

impl From<GateError> for ToolError {
    fn from(error: GateError) -> Self {
        match error {
            GateError::Denied(denial) => Self::Denied(denial),
            GateError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<WriteError> for ToolError {
    fn from(error: WriteError) -> Self {
        match error {
            WriteError::InvalidInput(message) => Self::invalid_input(message),
            WriteError::PrecedenceBlocked(conflict) => {
                Self::Denied(Denial::new(DenialCode::PrecedenceBlocked, conflict.to_string()))
            }
            WriteError::ConcurrentModification => Self::Denied(Denial::new(
                DenialCode::ConcurrentModification,
                WriteError::ConcurrentModification.to_string(),
            )),
            WriteError::Store(err) => Self::Internal(err.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

    use ontology_gate_core::StoreError;

    use super::*;

    #[test]
    fn denial_serializes_with_error_flag() {
        let denial = Denial::new(DenialCode::OperationNotEnabled, "echo is not enabled");
        let value = serde_json::to_value(&denial).unwrap();
        assert_eq!(value, denial.to_value());
        assert_eq!(value["error"], true);
        assert_eq!(value["code"], "OPERATION_NOT_ENABLED");
    }

    #[test]
    fn denial_code_wire_strings_match_serde() {
        for code in DenialCode::all() {
            let value = serde_json::to_value(code).unwrap();
            assert_eq!(value, code.as_str());
        }
    }

    #[test]
    fn store_faults_never_reach_the_caller() {
        let error = ToolError::from(WriteError::Store(StoreError::Io(
            "unable to open /var/lib/ontology.db".to_string(),
        )));
        assert!(error.denial().is_none());
        assert_eq!(error.caller_message(), INTERNAL_ERROR_MESSAGE);
        assert!(!error.to_response().to_string().contains("/var/lib"));
    }
}
