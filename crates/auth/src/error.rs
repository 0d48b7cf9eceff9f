//! Auth error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Signing key not configured (set {0})")]
    MissingKey(String),
}
