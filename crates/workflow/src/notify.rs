//! Fire-and-forget notification dispatch

use std::sync::Arc;
use std::time::Duration;

use clearance_core::{Decision, Department, Subject};

use crate::collaborators::{bounded, ArtifactRef, Notifier};

/// Wraps an optional [`Notifier`] with a timeout and failure swallowing
///
/// `send` never fails: delivery problems are logged and reported as `false`.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Option<Arc<dyn Notifier>>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: Option<Arc<dyn Notifier>>, timeout: Duration) -> Self {
        Self { notifier, timeout }
    }

    /// Dispatcher that drops every message
    pub fn disabled() -> Self {
        Self::new(None, Duration::from_millis(0))
    }

    pub fn is_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    /// Deliver a message; returns whether delivery succeeded
    pub async fn send(&self, address: &str, subject_line: &str, body: &str) -> bool {
        let Some(notifier) = &self.notifier else {
            return false;
        };

        match bounded(self.timeout, notifier.notify(address, subject_line, body)).await {
            Ok(()) => {
                tracing::debug!(address, subject_line, "Notification delivered");
                true
            }
            Err(e) => {
                tracing::warn!(address, subject_line, error = %e, "Notification failed");
                false
            }
        }
    }

    pub async fn request_submitted(&self, subject: &Subject, department: Department) -> bool {
        self.send(
            &subject.contact,
            &format!("{} Clearance Requested", department),
            "Your clearance request is pending approval.",
        )
        .await
    }

    pub async fn request_decided(
        &self,
        subject: &Subject,
        department: Department,
        decision: Decision,
    ) -> bool {
        self.send(
            &subject.contact,
            &format!("{} Clearance {}", department, decision),
            &format!("Your {} clearance has been {}.", department, decision),
        )
        .await
    }

    pub async fn certificate_issued(&self, subject: &Subject, artifact: &ArtifactRef) -> bool {
        self.send(
            &subject.contact,
            "Clearance Certificate",
            &format!(
                "Attached is your clearance certificate: {}",
                artifact.location
            ),
        )
        .await
    }
}
