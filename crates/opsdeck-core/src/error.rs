// ── Core error types ──
//
// User-facing errors from opsdeck-core. Consumers (CLI) map these into
// diagnostics; nothing here knows about exit codes or terminals.

use thiserror::Error;

use crate::flow::ValidationReport;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Duplicate id: {entity_type} with id {identifier} already exists")]
    DuplicateId {
        entity_type: String,
        identifier: String,
    },

    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Call flow is invalid: {} error(s)", report.errors().count())]
    InvalidGraph { report: ValidationReport },

    #[error("No device selected")]
    NoDeviceSelected,

    // ── Probe errors ─────────────────────────────────────────────────
    #[error("Connection to {target} timed out after {timeout_ms}ms")]
    Timeout { target: String, timeout_ms: u64 },

    #[error("Connection attempt to {target} was cancelled")]
    Cancelled { target: String },

    #[error("Cannot connect to {target}: {reason}")]
    ConnectionFailed { target: String, reason: String },

    // ── Serialization / IO ───────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn not_found(entity_type: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
