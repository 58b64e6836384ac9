use std::time::Duration;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AccessError>;

/// Failures raised by the persistence collaborator during dynamic-role lookups,
/// commit, or refresh.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("persistence call timed out after {0:?}")]
    Timeout(Duration),

    #[error("persistence backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("persistence {operation} failed: {reason}")]
    Operation {
        operation: &'static str,
        reason: String,
    },
}

/// Canonical error surface for access decisions.
///
/// `PermissionDenied` is the only variant that means "you may not". Every other
/// variant means the engine could not reach a decision and must never be mapped
/// onto an authorization failure by the transport layer.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Access Permission Denied for the URL: {reason}")]
    PermissionDenied { reason: String },

    #[error("unknown resource type: {name}")]
    UnknownResourceType { name: String },

    #[error("no permission mapping for {method} {endpoint}")]
    UnmappedEndpoint { method: String, endpoint: String },

    #[error("access check could not complete: {0}")]
    PersistenceFailure(#[from] PersistenceError),

    #[error("invalid policy: {reason}")]
    InvalidPolicy { reason: String },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AccessError {
    pub(crate) fn denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    /// True only for a policy decision against the caller.
    #[must_use]
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// True when a collaborator failed and no decision was reached.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        matches!(self, Self::PersistenceFailure(_))
    }
}
