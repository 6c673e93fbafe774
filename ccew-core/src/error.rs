//! Error taxonomy for the CCEW session engine.
//!
//! Every fallible operation returns one of these structured variants —
//! callers (the HTTP layer in particular) branch on them to pick status
//! codes and user-facing messages, so no failure is ever surfaced as an
//! opaque string.

use thiserror::Error;
use uuid::Uuid;

/// Top-level error for session lifecycle operations.
#[derive(Error, Debug)]
pub enum CcewError {
    /// The session id was never issued, or has expired.
    #[error("unknown or expired session {session_id}")]
    NotFound { session_id: Uuid },

    /// The certificate for this session was already submitted and
    /// distributed. Terminal — a corrected resubmission is not possible.
    #[error("session {session_id} has already been completed")]
    AlreadyCompleted { session_id: Uuid },

    /// Another submit for the same session is currently distributing.
    #[error("a submission for session {session_id} is already in flight")]
    SubmissionInFlight { session_id: Uuid },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("distribution failed: {0}")]
    Distribution(#[from] DistributionError),
}

/// Rejections from the merge engine. Always names the offending field so
/// the technician can correct the form and resubmit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field '{field}' is missing or empty")]
    MissingField { field: String },

    #[error("field '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },
}

impl ValidationError {
    pub fn missing(field: &str) -> Self {
        ValidationError::MissingField {
            field: field.to_string(),
        }
    }
}

/// Failures from the rendering/dispatch collaborators. Any of these must
/// leave the session `Pending` so an identical retry can succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistributionError {
    #[error("certificate rendering failed: {message}")]
    Pdf { message: String },

    #[error("certificate dispatch failed: {message}")]
    Email { message: String },
}
