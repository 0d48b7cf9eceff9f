//! Shared test doubles for workflow integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clearance_core::{ClearanceStatus, DecisionRequest, Department, Subject};
use clearance_workflow::{
    ArtifactGenerator, ArtifactRef, ClearanceConfig, ClearanceWorkflow, CollaboratorError,
    Notifier, ScanCodeEncoder,
};
use parking_lot::Mutex;

/// Generator that records which subjects it was invoked for
#[derive(Default)]
pub struct CountingGenerator {
    pub issued_for: Mutex<Vec<String>>,
    fail: bool,
    delay: Option<Duration>,
}

impl CountingGenerator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.issued_for.lock().len()
    }

    pub fn calls_for(&self, subject_id: &str) -> usize {
        self.issued_for
            .lock()
            .iter()
            .filter(|id| id.as_str() == subject_id)
            .count()
    }
}

#[async_trait]
impl ArtifactGenerator for CountingGenerator {
    async fn generate(&self, subject: &Subject) -> Result<ArtifactRef, CollaboratorError> {
        self.issued_for.lock().push(subject.id.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(CollaboratorError::GenerationFailed("renderer offline".into()));
        }
        Ok(ArtifactRef::new(format!("certificates/{}.pdf", subject.id)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub address: String,
    pub subject_line: String,
    pub body: String,
}

/// Notifier that records messages, optionally failing every delivery
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<Message>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` deliveries were attempted (spawned
    /// notifications land asynchronously)
    pub async fn wait_for_attempts(&self, count: usize) {
        for _ in 0..200 {
            if self.attempts() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} notification attempts, saw {}", count, self.attempts());
    }

    pub fn subject_lines(&self) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .map(|m| m.subject_line.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        address: &str,
        subject_line: &str,
        body: &str,
    ) -> Result<(), CollaboratorError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CollaboratorError::DeliveryFailed("no mail provider".into()));
        }
        self.messages.lock().push(Message {
            address: address.to_string(),
            subject_line: subject_line.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Encoder that returns the payload prefixed with a marker
pub struct EchoEncoder;

impl ScanCodeEncoder for EchoEncoder {
    fn encode(&self, payload: &[u8]) -> Result<Vec<u8>, CollaboratorError> {
        let mut image = b"IMG:".to_vec();
        image.extend_from_slice(payload);
        Ok(image)
    }
}

pub fn test_config() -> ClearanceConfig {
    ClearanceConfig {
        external_timeout_ms: 200,
        ..ClearanceConfig::default()
    }
}

pub fn workflow_with(
    generator: Arc<CountingGenerator>,
    notifier: Arc<RecordingNotifier>,
) -> ClearanceWorkflow {
    ClearanceWorkflow::builder(generator)
        .notifier(notifier)
        .config(test_config())
        .build()
}

pub fn register(workflow: &ClearanceWorkflow, id: &str) -> Subject {
    workflow
        .register(id, &format!("Student {}", id), &format!("{}@example.edu", id.to_lowercase()))
        .unwrap()
}

/// One pending request per department, in declaration order
pub async fn submit_all(workflow: &ClearanceWorkflow, subject_id: &str) -> Vec<DecisionRequest> {
    let mut requests = Vec::new();
    for department in Department::all() {
        requests.push(workflow.submit(subject_id, department).await.unwrap());
    }
    requests
}

/// `artifact_issued` iff all approved, and the ledger view matches the snapshot
pub fn assert_consistent(workflow: &ClearanceWorkflow, subject_id: &str) {
    let subject = workflow.find(subject_id).unwrap();
    let all_approved = subject
        .status_by_department
        .values()
        .all(|s| *s == ClearanceStatus::Approved);

    assert_eq!(
        subject.artifact_issued, all_approved,
        "issued flag out of step for {}",
        subject_id
    );
    assert!(
        workflow.verify(subject_id).unwrap().is_empty(),
        "snapshot diverged from ledger for {}",
        subject_id
    );

    let view = workflow.status(subject_id).unwrap();
    assert_eq!(view.statuses(), subject.status_by_department);
    assert_eq!(view.artifact_issued, subject.artifact_issued);
}
