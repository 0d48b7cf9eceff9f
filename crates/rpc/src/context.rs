//! Application context - wires everything together
//!
//! On startup the journal is replayed into a fresh workflow and every subject
//! snapshot is rebuilt from the ledger. Each accepted command then appends one
//! event, so the next process sees the same state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clearance_auth::{AuthConfig, AuthError, Authenticator, TokenAuthenticator};
use clearance_core::{DecisionRequest, Subject};
use clearance_events::{ClearanceEvent, EventError, EventReader, EventStore};
use clearance_workflow::{
    ArtifactGenerator, ClearanceConfig, ClearanceError, ClearanceWorkflow, Resolution, StatusView,
};

use crate::collaborators::{CertificateWriter, LogNotifier};

/// Application context - wires together all components
pub struct AppContext {
    pub workflow: ClearanceWorkflow,
    event_store: EventStore,
    journal_path: PathBuf,
    certificates_path: PathBuf,
    replayed: usize,
}

impl AppContext {
    /// Open a data directory and replay its journal
    pub fn new(data_path: impl AsRef<Path>, config: ClearanceConfig) -> Result<Self, anyhow::Error> {
        let certificates_path = data_path.as_ref().join("certificates");
        let generator = Arc::new(CertificateWriter::new(&certificates_path));
        Self::with_generator(data_path, config, generator)
    }

    /// Same as [`new`](Self::new) with a caller-supplied certificate generator
    pub fn with_generator(
        data_path: impl AsRef<Path>,
        config: ClearanceConfig,
        generator: Arc<dyn ArtifactGenerator>,
    ) -> Result<Self, anyhow::Error> {
        let data_path = data_path.as_ref();
        let journal_path = data_path.join("journal");
        let certificates_path = data_path.join("certificates");

        std::fs::create_dir_all(&journal_path)?;

        let workflow = ClearanceWorkflow::builder(generator)
            .notifier(Arc::new(LogNotifier))
            .config(config)
            .build();

        let events = EventReader::from_directory(&journal_path)?.read_all()?;
        let subjects = replay(&workflow, &events)?;
        tracing::info!(events = events.len(), subjects, "Journal replayed");

        let event_store = EventStore::new(&journal_path)?;

        Ok(Self {
            workflow,
            event_store,
            journal_path,
            certificates_path,
            replayed: events.len(),
        })
    }

    pub fn register(
        &mut self,
        id: &str,
        name: &str,
        contact: &str,
    ) -> Result<Subject, ContextError> {
        let subject = self.workflow.register(id, name, contact)?;
        self.event_store
            .append(&ClearanceEvent::subject_registered(subject.clone()))?;
        Ok(subject)
    }

    pub async fn submit(
        &mut self,
        subject_id: &str,
        department: &str,
    ) -> Result<DecisionRequest, ContextError> {
        let request = self.workflow.submit_named(subject_id, department).await?;
        self.event_store
            .append(&ClearanceEvent::request_submitted(request.clone()))?;
        Ok(request)
    }

    /// Resolve a request
    ///
    /// Flow: Commit → Append → Notify/Issue. The resolution is journaled
    /// before the decision notification and the certificate generator run; if
    /// the append fails neither runs.
    pub async fn resolve(
        &mut self,
        request_id: &str,
        decision: &str,
    ) -> Result<Resolution, ContextError> {
        let committed = self.workflow.commit_named(request_id, decision)?;

        let event =
            ClearanceEvent::request_resolved(committed.request.clone(), committed.issuance_due);
        if let Err(e) = self.event_store.append(&event) {
            tracing::error!(
                request_id,
                error = %e,
                "Resolution applied but not journaled; skipping notifications and issuance"
            );
            return Err(e.into());
        }

        Ok(self.workflow.finish(committed).await)
    }

    /// Status of the subject a token belongs to
    pub fn my_status(&self, auth: &AuthConfig, token: &str) -> Result<StatusView, ContextError> {
        let subject_id = TokenAuthenticator::new(auth)?.authenticate(token)?;
        Ok(self.workflow.status(&subject_id)?)
    }

    /// Issue an identity token for a registered subject
    pub fn issue_token(&self, auth: &AuthConfig, subject_id: &str) -> Result<String, ContextError> {
        self.workflow.find(subject_id)?;
        Ok(TokenAuthenticator::new(auth)?.issue(subject_id))
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    pub fn certificates_path(&self) -> &Path {
        &self.certificates_path
    }

    /// Number of journal events replayed at startup
    pub fn replayed(&self) -> usize {
        self.replayed
    }
}

/// Restore registry and ledger from events, then rebuild snapshots
fn replay(workflow: &ClearanceWorkflow, events: &[ClearanceEvent]) -> Result<usize, ClearanceError> {
    for event in events {
        match event {
            ClearanceEvent::SubjectRegistered { subject, .. } => {
                workflow.restore_subject(subject.clone())?;
            }
            ClearanceEvent::RequestSubmitted { request, .. }
            | ClearanceEvent::RequestResolved { request, .. } => {
                workflow.restore_request(request.clone())?;
            }
        }
    }
    workflow.rebuild_snapshots()
}

/// Errors from context operations
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Clearance(#[from] ClearanceError),

    #[error("Journal error: {0}")]
    Event(#[from] EventError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}
