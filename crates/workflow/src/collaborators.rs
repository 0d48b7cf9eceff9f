//! External collaborators consumed by the workflow
//!
//! Implementations live outside this crate. Every call the workflow makes
//! through these traits is bounded by [`bounded`] and its failure is logged,
//! never propagated into a state transition.

use async_trait::async_trait;
use chrono::Utc;
use clearance_core::Subject;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by external collaborators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("Artifact generation failed: {0}")]
    GenerationFailed(String),

    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Scan code encoding failed: {0}")]
    EncodingFailed(String),

    #[error("External call timed out after {0}ms")]
    Timeout(u64),
}

/// Reference to a generated clearance certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Where the artifact can be fetched (path, URL, object key)
    pub location: String,

    /// Content fingerprint, if the generator computes one
    pub fingerprint: Option<String>,
}

impl ArtifactRef {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            fingerprint: None,
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }
}

/// Renders the clearance certificate for a fully approved subject
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    async fn generate(&self, subject: &Subject) -> Result<ArtifactRef, CollaboratorError>;
}

/// Best-effort outbound messaging (email, SMS, ...)
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, address: &str, subject_line: &str, body: &str)
        -> Result<(), CollaboratorError>;
}

/// Turns a payload into scannable image data (QR or similar)
///
/// Pure function; only used on read paths.
pub trait ScanCodeEncoder: Send + Sync {
    fn encode(&self, payload: &[u8]) -> Result<Vec<u8>, CollaboratorError>;
}

/// Data carried by a subject's identity code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanPayload {
    pub subject_id: String,
    /// Unix epoch milliseconds at encoding time
    pub timestamp: i64,
}

impl ScanPayload {
    pub fn now(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// JSON bytes handed to the encoder
    pub fn to_bytes(&self) -> Vec<u8> {
        // A struct of a String and an i64 always serializes
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// Run an external call with an upper time bound
pub async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, CollaboratorError>
where
    F: Future<Output = Result<T, CollaboratorError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::Timeout(timeout.as_millis() as u64)),
    }
}
