//! Workflow errors

use clearance_core::{ClearanceStatus, CoreError};
use thiserror::Error;

/// Errors returned synchronously by the clearance workflow
///
/// Collaborator failures (generator, notifier) are not represented here: they
/// never fail a state transition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClearanceError {
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Request not found: {0}")]
    RequestNotFound(String),

    #[error("Subject already exists: {0}")]
    DuplicateSubject(String),

    #[error("Invalid department: {0}")]
    InvalidDepartment(String),

    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Request {request_id} already {status}")]
    AlreadyResolved {
        request_id: String,
        status: ClearanceStatus,
    },

    /// The subject's certificate is issued, so a rejection can no longer be
    /// applied; approvals and new submissions are still accepted
    #[error("Subject {subject_id} is already cleared; request {request_id} cannot be rejected")]
    CannotRejectCleared {
        request_id: String,
        subject_id: String,
    },

    #[error("Scan code encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for workflow operations
pub type ClearanceResult<T> = Result<T, ClearanceError>;

impl ClearanceError {
    /// Unknown subject or unknown request
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClearanceError::SubjectNotFound(_) | ClearanceError::RequestNotFound(_)
        )
    }
}

impl From<CoreError> for ClearanceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidDepartment(name) => ClearanceError::InvalidDepartment(name),
            CoreError::InvalidDecision(value) => ClearanceError::InvalidDecision(value),
            CoreError::InvalidStatus(value) => ClearanceError::InvalidStatus(value),
            CoreError::AlreadyResolved { request_id, status } => {
                ClearanceError::AlreadyResolved { request_id, status }
            }
        }
    }
}
