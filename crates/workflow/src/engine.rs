//! Aggregation engine - the only writer of subject status snapshots
//!
//! Every mutation of a subject happens inside that subject's lock:
//!
//! 1. the ledger request is moved pending → decided (compare-and-swap)
//! 2. `status_by_department[dept] = decision` (last resolution wins)
//! 3. `all_approved` is recomputed over the fixed department set
//! 4. if all approved and not yet issued, `artifact_issued` flips to true
//!
//! Readers take the same lock, so no one observes the statuses and the issued
//! flag out of step. Once issued, a subject still accepts approvals (recorded,
//! never re-triggering) but refuses rejections with `CannotRejectCleared`.
//!
//! `commit` does the steps above; `finish` runs the side effects after the
//! lock is released, and only for the caller that performed the flip does it
//! run the issuance trigger.

use std::sync::Arc;

use clearance_core::{Decision, DecisionRequest, Department, Subject};
use serde::Serialize;

use crate::config::ClearanceConfig;
use crate::error::{ClearanceError, ClearanceResult};
use crate::issuance::{IssuanceOutcome, IssuanceTrigger};
use crate::ledger::DecisionLedger;
use crate::notify::NotificationDispatcher;
use crate::registry::SubjectRegistry;
use crate::view::{self, Divergence, StatusView};

/// Result of resolving a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// The request after resolution
    pub request: DecisionRequest,
    /// Subject snapshot right after the decision was applied
    pub subject: Subject,
    /// Present only for the resolution that completed the approval set
    pub issuance: Option<IssuanceOutcome>,
}

impl Resolution {
    pub fn triggered_issuance(&self) -> bool {
        self.issuance.is_some()
    }
}

/// A decision applied to ledger and snapshot whose side effects have not run
///
/// Produced by [`AggregationEngine::commit`] and consumed by
/// [`AggregationEngine::finish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    pub request: DecisionRequest,
    pub subject: Subject,
    pub decision: Decision,
    /// True only for the decision that flipped `artifact_issued`
    pub issuance_due: bool,
}

/// Result of repairing a snapshot from the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub subject: Subject,
    /// Departments that were out of step before the repair
    pub repaired: Vec<Divergence>,
    pub issuance: Option<IssuanceOutcome>,
}

/// Applies decisions to subject snapshots and detects full approval
pub struct AggregationEngine {
    registry: Arc<SubjectRegistry>,
    ledger: Arc<DecisionLedger>,
    trigger: IssuanceTrigger,
    notifications: NotificationDispatcher,
    notify_on_decision: bool,
}

impl AggregationEngine {
    pub fn new(
        registry: Arc<SubjectRegistry>,
        ledger: Arc<DecisionLedger>,
        trigger: IssuanceTrigger,
        notifications: NotificationDispatcher,
        config: &ClearanceConfig,
    ) -> Self {
        Self {
            registry,
            ledger,
            trigger,
            notifications,
            notify_on_decision: config.notify_on_decision,
        }
    }

    /// Resolve a pending request and fold the decision into the snapshot
    ///
    /// Runs [`commit`](Self::commit) and then [`finish`](Self::finish).
    /// Callers that persist resolutions call the two halves themselves so the
    /// record lands before any collaborator runs.
    pub async fn resolve(
        &self,
        request_id: &str,
        decision: Decision,
    ) -> ClearanceResult<Resolution> {
        let committed = self.commit(request_id, decision)?;
        Ok(self.finish(committed).await)
    }

    /// Apply a decision to the ledger and the snapshot, without side effects
    ///
    /// Errors: `RequestNotFound`, `AlreadyResolved`, `SubjectNotFound` (the
    /// subject is re-validated), and `CannotRejectCleared` for a rejection of a
    /// subject whose certificate was already issued. Nothing changes on error.
    /// An approval of an issued subject is recorded and never re-triggers.
    pub fn commit(&self, request_id: &str, decision: Decision) -> ClearanceResult<Committed> {
        let subject_id = self.ledger.get(request_id)?.subject_id;
        let handle = self.registry.handle(&subject_id)?;
        let mut subject = handle.lock();

        // All resolutions for this subject's requests run under this lock, so
        // the status read here cannot change before the CAS.
        let current = self.ledger.get(request_id)?;
        if !current.is_pending() {
            return Err(ClearanceError::AlreadyResolved {
                request_id: current.id,
                status: current.status,
            });
        }
        // Issued stays true, so a rejection would leave it set while not all
        // departments approve.
        if subject.artifact_issued && decision == Decision::Rejected {
            return Err(ClearanceError::CannotRejectCleared {
                request_id: current.id,
                subject_id,
            });
        }

        let request = self.ledger.resolve(request_id, decision)?;
        let issuance_due = apply(&mut subject, request.department, decision);

        tracing::info!(
            request_id = %request.id,
            subject_id = %subject.id,
            department = %request.department,
            decision = %decision,
            outstanding = subject.outstanding().len(),
            issuance_due,
            "Decision applied"
        );

        Ok(Committed {
            request,
            subject: subject.clone(),
            decision,
            issuance_due,
        })
    }

    /// Run the side effects of a committed decision: the decision
    /// notification, then the issuance trigger if this decision flipped the
    /// issued flag
    pub async fn finish(&self, committed: Committed) -> Resolution {
        let Committed {
            request,
            subject,
            decision,
            issuance_due,
        } = committed;

        if self.notify_on_decision {
            self.notifications
                .request_decided(&subject, request.department, decision)
                .await;
        }

        let issuance = if issuance_due {
            Some(self.trigger.on_fully_approved(&subject).await)
        } else {
            None
        };

        Resolution {
            request,
            subject,
            issuance,
        }
    }

    /// Status view derived from the ledger, read consistently with the
    /// subject's issued flag
    pub fn status_view(&self, subject_id: &str) -> ClearanceResult<StatusView> {
        let handle = self.registry.handle(subject_id)?;
        let subject = handle.lock();
        let requests = self.ledger.list_by_subject(subject_id);

        Ok(StatusView {
            subject_id: subject.id.clone(),
            name: subject.name.clone(),
            departments: view::derive_departments(&requests),
            artifact_issued: subject.artifact_issued,
        })
    }

    /// Departments where the snapshot disagrees with the ledger
    pub fn verify(&self, subject_id: &str) -> ClearanceResult<Vec<Divergence>> {
        let handle = self.registry.handle(subject_id)?;
        let subject = handle.lock();
        let derived = self.ledger.derive_statuses(subject_id);
        Ok(view::diverging(&subject, &derived))
    }

    /// Recompute the snapshot from the ledger, issuing if that completes the
    /// approval set
    pub async fn reconcile(&self, subject_id: &str) -> ClearanceResult<Reconciliation> {
        let handle = self.registry.handle(subject_id)?;

        let (subject, repaired, issuance_due) = {
            let mut subject = handle.lock();
            let derived = self.ledger.derive_statuses(subject_id);
            let repaired = view::diverging(&subject, &derived);

            if !repaired.is_empty() {
                tracing::warn!(
                    subject_id,
                    departments = repaired.len(),
                    "Snapshot diverged from ledger; repairing"
                );
                subject.status_by_department = derived;
            }

            let issuance_due = settle(&mut subject);
            (subject.clone(), repaired, issuance_due)
        };

        if subject.artifact_issued && !subject.all_approved() {
            tracing::error!(subject_id, "Issued subject no longer fully approved");
        }

        let issuance = if issuance_due {
            Some(self.trigger.on_fully_approved(&subject).await)
        } else {
            None
        };

        Ok(Reconciliation {
            subject,
            repaired,
            issuance,
        })
    }

    /// Rebuild the snapshot from the ledger without side effects
    ///
    /// Used after replaying a journal, where issuance already happened in the
    /// run that recorded it.
    pub fn restore_snapshot(&self, subject_id: &str) -> ClearanceResult<Subject> {
        let handle = self.registry.handle(subject_id)?;
        let mut subject = handle.lock();

        subject.status_by_department = self.ledger.derive_statuses(subject_id);
        settle(&mut subject);

        Ok(subject.clone())
    }
}

/// Steps 2-4: record the decision, then run the issuance check
///
/// Returns true only for the call that flips `artifact_issued`.
fn apply(subject: &mut Subject, department: Department, decision: Decision) -> bool {
    subject
        .status_by_department
        .insert(department, decision.into());
    settle(subject)
}

/// Flip `artifact_issued` if every department approved; true if it flipped
fn settle(subject: &mut Subject) -> bool {
    if subject.all_approved() && !subject.artifact_issued {
        subject.artifact_issued = true;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearance_core::ClearanceStatus;

    #[test]
    fn test_apply_last_write_wins() {
        let mut subject = Subject::new("S1", "Ada Obi", "ada@example.edu");

        assert!(!apply(&mut subject, Department::Finance, Decision::Rejected));
        assert_eq!(subject.status(Department::Finance), ClearanceStatus::Rejected);

        assert!(!apply(&mut subject, Department::Finance, Decision::Approved));
        assert_eq!(subject.status(Department::Finance), ClearanceStatus::Approved);
        assert!(!subject.artifact_issued);
    }

    #[test]
    fn test_apply_flips_exactly_once() {
        let mut subject = Subject::new("S1", "Ada Obi", "ada@example.edu");
        let departments: Vec<_> = Department::all().collect();
        let (last, rest) = departments.split_last().unwrap();

        for dept in rest {
            assert!(!apply(&mut subject, *dept, Decision::Approved));
        }
        assert!(apply(&mut subject, *last, Decision::Approved));
        assert!(subject.artifact_issued);

        // Re-applying an approval never re-triggers
        assert!(!apply(&mut subject, *last, Decision::Approved));
        assert!(!settle(&mut subject));
    }

    #[test]
    fn test_rejection_blocks_issuance() {
        let mut subject = Subject::new("S1", "Ada Obi", "ada@example.edu");
        apply(&mut subject, Department::Finance, Decision::Rejected);
        for dept in Department::all().filter(|d| *d != Department::Finance) {
            assert!(!apply(&mut subject, dept, Decision::Approved));
        }
        assert!(!subject.artifact_issued);
    }
}
