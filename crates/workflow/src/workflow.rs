//! Clearance workflow - the request surface callers drive
//!
//! Wires registry, ledger, engine and collaborators together and exposes the
//! operations of the clearance process: register, submit, resolve, query.

use std::sync::Arc;

use clearance_core::{ClearanceStatus, Decision, DecisionRequest, Department, Subject};

use crate::collaborators::{ArtifactGenerator, Notifier, ScanCodeEncoder, ScanPayload};
use crate::config::ClearanceConfig;
use crate::engine::{AggregationEngine, Committed, Reconciliation, Resolution};
use crate::error::{ClearanceError, ClearanceResult};
use crate::issuance::IssuanceTrigger;
use crate::ledger::{DecisionLedger, LedgerStats, RequestFilter};
use crate::notify::NotificationDispatcher;
use crate::registry::SubjectRegistry;
use crate::view::{Divergence, StatusView};

/// Multi-department clearance workflow
pub struct ClearanceWorkflow {
    config: ClearanceConfig,
    registry: Arc<SubjectRegistry>,
    ledger: Arc<DecisionLedger>,
    engine: AggregationEngine,
    notifications: NotificationDispatcher,
    scan_encoder: Option<Arc<dyn ScanCodeEncoder>>,
}

impl ClearanceWorkflow {
    /// Start building a workflow around an artifact generator
    pub fn builder(generator: Arc<dyn ArtifactGenerator>) -> WorkflowBuilder {
        WorkflowBuilder::new(generator)
    }

    pub fn config(&self) -> &ClearanceConfig {
        &self.config
    }

    pub fn registry(&self) -> &SubjectRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &DecisionLedger {
        &self.ledger
    }

    pub fn engine(&self) -> &AggregationEngine {
        &self.engine
    }

    // === Subjects ===

    /// Register a subject; fails with `DuplicateSubject` if the id exists
    pub fn register(&self, id: &str, name: &str, contact: &str) -> ClearanceResult<Subject> {
        self.registry.register(id, name, contact)
    }

    pub fn find(&self, subject_id: &str) -> ClearanceResult<Subject> {
        self.registry.find(subject_id)
    }

    // === Requests ===

    /// Submit a request for a department given by name
    ///
    /// Unknown department names fail with `InvalidDepartment` before anything
    /// is recorded.
    pub async fn submit_named(
        &self,
        subject_id: &str,
        department: &str,
    ) -> ClearanceResult<DecisionRequest> {
        let department = Department::parse(department)?;
        self.submit(subject_id, department).await
    }

    /// Submit a request and notify the subject
    ///
    /// The notification is spawned onto the runtime and bounded by the
    /// external timeout; the caller never waits for it.
    pub async fn submit(
        &self,
        subject_id: &str,
        department: Department,
    ) -> ClearanceResult<DecisionRequest> {
        let request = self.ledger.submit(&self.registry, subject_id, department)?;

        if self.config.notify_on_submit {
            let subject = self.registry.find(subject_id)?;
            let notifications = self.notifications.clone();
            tokio::spawn(async move {
                notifications.request_submitted(&subject, department).await;
            });
        }

        Ok(request)
    }

    /// Resolve a request with a decision given by name
    ///
    /// The decision is validated first: anything but "approved" or
    /// "rejected" fails with `InvalidDecision` and nothing is looked up.
    pub async fn resolve_named(
        &self,
        request_id: &str,
        decision: &str,
    ) -> ClearanceResult<Resolution> {
        let decision = Decision::parse(decision)?;
        self.resolve(request_id, decision).await
    }

    pub async fn resolve(
        &self,
        request_id: &str,
        decision: Decision,
    ) -> ClearanceResult<Resolution> {
        self.engine.resolve(request_id, decision).await
    }

    /// First half of [`resolve_named`](Self::resolve_named): record the
    /// decision without running notifications or issuance
    pub fn commit_named(&self, request_id: &str, decision: &str) -> ClearanceResult<Committed> {
        let decision = Decision::parse(decision)?;
        self.engine.commit(request_id, decision)
    }

    /// Second half: decision notification, then issuance if due
    pub async fn finish(&self, committed: Committed) -> Resolution {
        self.engine.finish(committed).await
    }

    pub fn request(&self, request_id: &str) -> ClearanceResult<DecisionRequest> {
        self.ledger.get(request_id)
    }

    pub fn requests(&self, filter: &RequestFilter) -> Vec<DecisionRequest> {
        self.ledger.list(filter)
    }

    pub fn requests_by_subject(&self, subject_id: &str) -> Vec<DecisionRequest> {
        self.ledger.list_by_subject(subject_id)
    }

    pub fn requests_by_department(
        &self,
        department: Department,
        status: Option<ClearanceStatus>,
    ) -> Vec<DecisionRequest> {
        self.ledger.list_by_department(department, status)
    }

    pub fn stats(&self) -> LedgerStats {
        self.ledger.stats()
    }

    // === Read paths ===

    /// Per-department status view plus whether the certificate was issued
    pub fn status(&self, subject_id: &str) -> ClearanceResult<StatusView> {
        tracing::debug!(subject_id, "Status query");
        self.engine.status_view(subject_id)
    }

    /// Scannable identity code for a subject
    pub fn identity_code(&self, subject_id: &str) -> ClearanceResult<Vec<u8>> {
        let subject = self.registry.find(subject_id)?;
        let encoder = self
            .scan_encoder
            .as_ref()
            .ok_or_else(|| ClearanceError::Config("no scan code encoder configured".into()))?;

        encoder
            .encode(&ScanPayload::now(subject.id).to_bytes())
            .map_err(|e| ClearanceError::EncodingFailed(e.to_string()))
    }

    // === Consistency ===

    pub fn verify(&self, subject_id: &str) -> ClearanceResult<Vec<Divergence>> {
        self.engine.verify(subject_id)
    }

    pub async fn reconcile(&self, subject_id: &str) -> ClearanceResult<Reconciliation> {
        self.engine.reconcile(subject_id).await
    }

    // === Replay ===

    /// Re-insert a subject recorded earlier (identity only; statuses are
    /// rebuilt by [`rebuild_snapshots`](Self::rebuild_snapshots))
    pub fn restore_subject(&self, subject: Subject) -> ClearanceResult<Subject> {
        self.registry.insert(subject)
    }

    /// Re-insert a request recorded earlier; resolved requests are never
    /// replaced
    pub fn restore_request(&self, request: DecisionRequest) -> ClearanceResult<()> {
        self.ledger.restore(request)
    }

    /// Rebuild every snapshot from the ledger without triggering issuance
    pub fn rebuild_snapshots(&self) -> ClearanceResult<usize> {
        let ids = self.registry.ids();
        for id in &ids {
            self.engine.restore_snapshot(id)?;
        }
        Ok(ids.len())
    }
}

/// Builder for [`ClearanceWorkflow`]
pub struct WorkflowBuilder {
    config: ClearanceConfig,
    generator: Arc<dyn ArtifactGenerator>,
    notifier: Option<Arc<dyn Notifier>>,
    scan_encoder: Option<Arc<dyn ScanCodeEncoder>>,
}

impl WorkflowBuilder {
    pub fn new(generator: Arc<dyn ArtifactGenerator>) -> Self {
        Self {
            config: ClearanceConfig::default(),
            generator,
            notifier: None,
            scan_encoder: None,
        }
    }

    pub fn config(mut self, config: ClearanceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn scan_encoder(mut self, encoder: Arc<dyn ScanCodeEncoder>) -> Self {
        self.scan_encoder = Some(encoder);
        self
    }

    pub fn build(self) -> ClearanceWorkflow {
        let timeout = self.config.external_timeout();
        let notifications = NotificationDispatcher::new(self.notifier, timeout);
        let registry = Arc::new(SubjectRegistry::new());
        let ledger = Arc::new(DecisionLedger::new());

        let trigger = IssuanceTrigger::new(
            self.generator,
            notifications.clone(),
            self.config.notify_on_issuance,
            timeout,
        );
        let engine = AggregationEngine::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            trigger,
            notifications.clone(),
            &self.config,
        );

        ClearanceWorkflow {
            config: self.config,
            registry,
            ledger,
            engine,
            notifications,
            scan_encoder: self.scan_encoder,
        }
    }
}
