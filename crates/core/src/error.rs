//! Core errors

use crate::status::ClearanceStatus;
use thiserror::Error;

/// Errors raised while parsing or transitioning core domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid department: {0}")]
    InvalidDepartment(String),

    #[error("Invalid decision: {0} (expected 'approved' or 'rejected')")]
    InvalidDecision(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Request {request_id} already {status}")]
    AlreadyResolved {
        request_id: String,
        status: ClearanceStatus,
    },
}
