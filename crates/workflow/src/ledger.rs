//! Decision ledger - append/update log of decision requests
//!
//! The ledger is the source of truth for every department that has at least
//! one request. Requests are never deleted; each moves from `pending` to a
//! terminal status exactly once.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use clearance_core::{ClearanceStatus, Decision, DecisionRequest, Department};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ClearanceError, ClearanceResult};
use crate::registry::SubjectRegistry;
use crate::view;

/// Filter for administrative request listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub subject: Option<String>,
    pub department: Option<Department>,
    pub status: Option<ClearanceStatus>,
}

impl RequestFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject = Some(subject_id.into());
        self
    }

    pub fn department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }

    pub fn status(mut self, status: ClearanceStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, request: &DecisionRequest) -> bool {
        self.subject.as_deref().map_or(true, |s| request.subject_id == s)
            && self.department.map_or(true, |d| request.department == d)
            && self.status.map_or(true, |s| request.status == s)
    }
}

/// Request counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl LedgerStats {
    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }
}

/// In-memory decision ledger
#[derive(Default)]
pub struct DecisionLedger {
    requests: DashMap<String, DecisionRequest>,
    /// Request ids per subject, in submission order
    by_subject: DashMap<String, Vec<String>>,
    /// Global resolution order; stamps `resolution_seq`
    resolution_clock: AtomicU64,
}

impl DecisionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new pending request for a subject and department
    ///
    /// Fails only with `SubjectNotFound`. The lookup and the insert happen
    /// under the subject's lock. A request for an already cleared subject is
    /// recorded but leaves the derived status unchanged until resolved.
    pub fn submit(
        &self,
        registry: &SubjectRegistry,
        subject_id: &str,
        department: Department,
    ) -> ClearanceResult<DecisionRequest> {
        let handle = registry.handle(subject_id)?;
        let _subject = handle.lock();

        let request = DecisionRequest::new(subject_id, department);
        self.index(&request);
        self.requests.insert(request.id.clone(), request.clone());

        tracing::info!(
            request_id = %request.id,
            subject_id,
            department = %department,
            "Decision request submitted"
        );

        Ok(request)
    }

    /// Get a request by id
    pub fn get(&self, request_id: &str) -> ClearanceResult<DecisionRequest> {
        self.requests
            .get(request_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ClearanceError::RequestNotFound(request_id.to_string()))
    }

    /// Compare-and-swap a request from pending to a terminal status
    ///
    /// The transition is accepted only if the request is still pending while
    /// its entry is write-locked; a concurrent loser gets `AlreadyResolved`.
    /// Callers hold the owning subject's lock so the snapshot is updated in the
    /// same critical section.
    pub(crate) fn resolve(
        &self,
        request_id: &str,
        decision: Decision,
    ) -> ClearanceResult<DecisionRequest> {
        let mut entry = self
            .requests
            .get_mut(request_id)
            .ok_or_else(|| ClearanceError::RequestNotFound(request_id.to_string()))?;

        if !entry.is_pending() {
            return Err(ClearanceError::AlreadyResolved {
                request_id: request_id.to_string(),
                status: entry.status,
            });
        }

        let seq = self.resolution_clock.fetch_add(1, Ordering::SeqCst) + 1;
        entry.resolve(decision, seq)?;

        Ok(entry.value().clone())
    }

    /// Insert a recorded request, or move a pending one to its recorded state
    /// (journal replay)
    ///
    /// A request that is already resolved is never replaced: restoring it
    /// fails with `AlreadyResolved` unless the record is identical.
    pub fn restore(&self, request: DecisionRequest) -> ClearanceResult<()> {
        match self.requests.entry(request.id.clone()) {
            Entry::Occupied(mut slot) => {
                let current = slot.get();
                if current == &request {
                    return Ok(());
                }
                if !current.is_pending() {
                    return Err(ClearanceError::AlreadyResolved {
                        request_id: request.id,
                        status: current.status,
                    });
                }
                self.advance_clock(&request);
                slot.insert(request);
            }
            Entry::Vacant(slot) => {
                self.advance_clock(&request);
                self.index(&request);
                slot.insert(request);
            }
        }
        Ok(())
    }

    fn advance_clock(&self, request: &DecisionRequest) {
        if let Some(seq) = request.resolution_seq {
            self.resolution_clock.fetch_max(seq, Ordering::SeqCst);
        }
    }

    /// All requests of a subject in submission order
    pub fn list_by_subject(&self, subject_id: &str) -> Vec<DecisionRequest> {
        let ids = match self.by_subject.get(subject_id) {
            Some(ids) => ids.value().clone(),
            None => return Vec::new(),
        };

        ids.iter()
            .filter_map(|id| self.requests.get(id).map(|r| r.value().clone()))
            .collect()
    }

    /// Requests for a department, optionally restricted to one status
    pub fn list_by_department(
        &self,
        department: Department,
        status: Option<ClearanceStatus>,
    ) -> Vec<DecisionRequest> {
        let filter = RequestFilter {
            department: Some(department),
            status,
            ..RequestFilter::default()
        };
        self.list(&filter)
    }

    /// Requests matching a filter, oldest first
    pub fn list(&self, filter: &RequestFilter) -> Vec<DecisionRequest> {
        let mut requests: Vec<DecisionRequest> = match &filter.subject {
            Some(subject_id) => self.list_by_subject(subject_id),
            None => self.requests.iter().map(|e| e.value().clone()).collect(),
        };

        requests.retain(|r| filter.matches(r));
        requests.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        requests
    }

    /// Most recent resolution per department; `pending` where none exists
    pub fn derive_statuses(&self, subject_id: &str) -> BTreeMap<Department, ClearanceStatus> {
        view::derive_statuses(&self.list_by_subject(subject_id))
    }

    pub fn stats(&self) -> LedgerStats {
        let mut stats = LedgerStats::default();
        for entry in self.requests.iter() {
            match entry.status {
                ClearanceStatus::Pending => stats.pending += 1,
                ClearanceStatus::Approved => stats.approved += 1,
                ClearanceStatus::Rejected => stats.rejected += 1,
            }
        }
        stats
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    fn index(&self, request: &DecisionRequest) {
        self.by_subject
            .entry(request.subject_id.clone())
            .or_default()
            .push(request.id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn setup() -> (SubjectRegistry, DecisionLedger) {
        let registry = SubjectRegistry::new();
        registry.register("S1", "Ada Obi", "ada@example.edu").unwrap();
        registry.register("S2", "Bayo Ade", "bayo@example.edu").unwrap();
        (registry, DecisionLedger::new())
    }

    #[test]
    fn test_submit_creates_pending_request() {
        let (registry, ledger) = setup();

        let request = ledger.submit(&registry, "S1", Department::Finance).unwrap();

        assert_eq!(request.status, ClearanceStatus::Pending);
        assert_eq!(request.subject_id, "S1");
        assert_eq!(ledger.get(&request.id).unwrap(), request);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_submit_unknown_subject() {
        let (registry, ledger) = setup();

        let err = ledger.submit(&registry, "ghost", Department::Finance).unwrap_err();
        assert_eq!(err, ClearanceError::SubjectNotFound("ghost".to_string()));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_resolve_once() {
        let (registry, ledger) = setup();
        let request = ledger.submit(&registry, "S1", Department::Library).unwrap();

        let resolved = ledger.resolve(&request.id, Decision::Approved).unwrap();
        assert_eq!(resolved.status, ClearanceStatus::Approved);
        assert_eq!(resolved.resolution_seq, Some(1));

        let err = ledger.resolve(&request.id, Decision::Rejected).unwrap_err();
        assert_eq!(
            err,
            ClearanceError::AlreadyResolved {
                request_id: request.id.clone(),
                status: ClearanceStatus::Approved,
            }
        );
        assert_eq!(ledger.get(&request.id).unwrap().status, ClearanceStatus::Approved);
    }

    #[test]
    fn test_resolve_unknown_request() {
        let (_, ledger) = setup();
        let err = ledger.resolve("REQ-NOPE", Decision::Approved).unwrap_err();
        assert_eq!(err, ClearanceError::RequestNotFound("REQ-NOPE".to_string()));
    }

    #[test]
    fn test_concurrent_cas_single_winner() {
        let (registry, ledger) = setup();
        let ledger = Arc::new(ledger);
        let request = ledger.submit(&registry, "S1", Department::Hostel).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                let id = request.id.clone();
                std::thread::spawn(move || {
                    let decision = if i % 2 == 0 { Decision::Approved } else { Decision::Rejected };
                    ledger.resolve(&id, decision)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        let losers = results
            .iter()
            .filter(|r| matches!(r, Err(ClearanceError::AlreadyResolved { .. })))
            .count();

        assert_eq!(winners, 1);
        assert_eq!(losers, 7);
    }

    #[test]
    fn test_listings() {
        let (registry, ledger) = setup();
        let f1 = ledger.submit(&registry, "S1", Department::Finance).unwrap();
        let l1 = ledger.submit(&registry, "S1", Department::Library).unwrap();
        let f2 = ledger.submit(&registry, "S2", Department::Finance).unwrap();
        ledger.resolve(&f2.id, Decision::Rejected).unwrap();

        let s1: Vec<_> = ledger.list_by_subject("S1").into_iter().map(|r| r.id).collect();
        assert_eq!(s1, vec![f1.id.clone(), l1.id.clone()]);
        assert!(ledger.list_by_subject("S3").is_empty());

        let finance = ledger.list_by_department(Department::Finance, None);
        assert_eq!(finance.len(), 2);

        let pending_finance =
            ledger.list_by_department(Department::Finance, Some(ClearanceStatus::Pending));
        assert_eq!(pending_finance.len(), 1);
        assert_eq!(pending_finance[0].id, f1.id);

        let filter = RequestFilter::new()
            .subject("S2")
            .status(ClearanceStatus::Rejected);
        assert_eq!(ledger.list(&filter).len(), 1);
    }

    #[test]
    fn test_derive_statuses_latest_resolution_wins() {
        let (registry, ledger) = setup();
        let first = ledger.submit(&registry, "S1", Department::Finance).unwrap();
        let second = ledger.submit(&registry, "S1", Department::Finance).unwrap();

        // Resolve the newer request first, then the older one
        ledger.resolve(&second.id, Decision::Approved).unwrap();
        ledger.resolve(&first.id, Decision::Rejected).unwrap();

        let statuses = ledger.derive_statuses("S1");
        assert_eq!(statuses[&Department::Finance], ClearanceStatus::Rejected);
        assert_eq!(statuses[&Department::Library], ClearanceStatus::Pending);
        assert_eq!(statuses.len(), Department::count());
    }

    #[test]
    fn test_restore_advances_clock() {
        let ledger = DecisionLedger::new();
        let mut request = DecisionRequest::new("S1", Department::Finance);
        request.resolve(Decision::Approved, 41).unwrap();
        ledger.restore(request.clone()).unwrap();

        // Restoring the same record again is a no-op
        ledger.restore(request.clone()).unwrap();
        assert_eq!(ledger.list_by_subject("S1").len(), 1);

        let next = DecisionRequest::new("S1", Department::Library);
        ledger.restore(next.clone()).unwrap();
        let resolved = ledger.resolve(&next.id, Decision::Approved).unwrap();
        assert_eq!(resolved.resolution_seq, Some(42));
    }

    #[test]
    fn test_stats() {
        let (registry, ledger) = setup();
        let a = ledger.submit(&registry, "S1", Department::Finance).unwrap();
        let b = ledger.submit(&registry, "S1", Department::Library).unwrap();
        ledger.submit(&registry, "S2", Department::Hostel).unwrap();
        ledger.resolve(&a.id, Decision::Approved).unwrap();
        ledger.resolve(&b.id, Decision::Rejected).unwrap();

        let stats = ledger.stats();
        assert_eq!(stats, LedgerStats { pending: 1, approved: 1, rejected: 1 });
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_restore_moves_pending_to_recorded_state() {
        let (registry, ledger) = setup();
        let request = ledger.submit(&registry, "S1", Department::Hostel).unwrap();

        let mut recorded = request.clone();
        recorded.resolve(Decision::Rejected, 5).unwrap();
        ledger.restore(recorded.clone()).unwrap();

        assert_eq!(ledger.get(&request.id).unwrap(), recorded);
        assert_eq!(ledger.list_by_subject("S1").len(), 1);
    }

    #[test]
    fn test_restore_never_replaces_resolved_request() {
        let (registry, ledger) = setup();
        let request = ledger.submit(&registry, "S1", Department::Finance).unwrap();
        let approved = ledger.resolve(&request.id, Decision::Approved).unwrap();

        // Neither back to pending nor to another decision
        let err = ledger.restore(request.clone()).unwrap_err();
        assert_eq!(
            err,
            ClearanceError::AlreadyResolved {
                request_id: request.id.clone(),
                status: ClearanceStatus::Approved,
            }
        );

        let mut flipped = request.clone();
        flipped.resolve(Decision::Rejected, 99).unwrap();
        assert!(ledger.restore(flipped).is_err());

        assert_eq!(ledger.get(&request.id).unwrap(), approved);
        assert!(ledger.resolve(&request.id, Decision::Rejected).is_err());
    }
}
