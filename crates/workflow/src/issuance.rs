//! Issuance trigger - hands a fully approved subject to the artifact generator
//!
//! The engine guarantees this runs at most once per subject. A generator
//! failure is reported, never rolled back: `artifact_issued` stays `true`
//! because the contract is "issuance was triggered", not "delivered".

use std::sync::Arc;
use std::time::Duration;

use clearance_core::Subject;
use serde::{Deserialize, Serialize};

use crate::collaborators::{bounded, ArtifactGenerator, ArtifactRef};
use crate::notify::NotificationDispatcher;

/// What happened when issuance was triggered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IssuanceOutcome {
    /// Generator produced the artifact
    Issued { artifact: ArtifactRef },
    /// Generator failed or timed out; the issued flag is kept
    Failed { reason: String },
}

impl IssuanceOutcome {
    pub fn is_issued(&self) -> bool {
        matches!(self, IssuanceOutcome::Issued { .. })
    }

    pub fn artifact(&self) -> Option<&ArtifactRef> {
        match self {
            IssuanceOutcome::Issued { artifact } => Some(artifact),
            IssuanceOutcome::Failed { .. } => None,
        }
    }
}

/// Fires the external artifact generator for fully approved subjects
#[derive(Clone)]
pub struct IssuanceTrigger {
    generator: Arc<dyn ArtifactGenerator>,
    notifications: NotificationDispatcher,
    notify_on_issuance: bool,
    timeout: Duration,
}

impl IssuanceTrigger {
    pub fn new(
        generator: Arc<dyn ArtifactGenerator>,
        notifications: NotificationDispatcher,
        notify_on_issuance: bool,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            notifications,
            notify_on_issuance,
            timeout,
        }
    }

    /// Generate the certificate and, on success, tell the subject
    pub async fn on_fully_approved(&self, subject: &Subject) -> IssuanceOutcome {
        tracing::info!(subject_id = %subject.id, "All departments approved, issuing certificate");

        match bounded(self.timeout, self.generator.generate(subject)).await {
            Ok(artifact) => {
                tracing::info!(
                    subject_id = %subject.id,
                    location = %artifact.location,
                    "Clearance certificate generated"
                );

                if self.notify_on_issuance {
                    self.notifications.certificate_issued(subject, &artifact).await;
                }

                IssuanceOutcome::Issued { artifact }
            }
            Err(e) => {
                tracing::error!(
                    subject_id = %subject.id,
                    error = %e,
                    "Certificate generation failed; issuance stays recorded"
                );
                IssuanceOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
