//! Read-path status views derived from the ledger
//!
//! The subject's `status_by_department` is a materialized view of the ledger:
//! for each department the most recently resolved request is authoritative,
//! and a department with no resolved request is `pending`. The functions here
//! compute that view from scratch so it can be compared against, or used to
//! repair, the snapshot.

use std::collections::BTreeMap;

use clearance_core::{ClearanceStatus, DecisionRequest, Department, Subject};
use serde::{Deserialize, Serialize};

/// Derived status of one department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentView {
    pub department: Department,
    pub status: ClearanceStatus,
    /// The authoritative request (latest resolved, else latest pending)
    pub request_id: Option<String>,
    /// Whether any request exists for this department
    pub requested: bool,
}

impl DepartmentView {
    pub fn describe(&self) -> &'static str {
        if !self.requested {
            return "no request sent yet";
        }
        match self.status {
            ClearanceStatus::Pending => "awaiting decision",
            ClearanceStatus::Approved => "approved",
            ClearanceStatus::Rejected => "rejected",
        }
    }
}

/// Full status answer for a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    pub subject_id: String,
    pub name: String,
    pub departments: Vec<DepartmentView>,
    pub artifact_issued: bool,
}

impl StatusView {
    pub fn status(&self, department: Department) -> ClearanceStatus {
        self.departments
            .iter()
            .find(|d| d.department == department)
            .map(|d| d.status)
            .unwrap_or_default()
    }

    pub fn statuses(&self) -> BTreeMap<Department, ClearanceStatus> {
        self.departments
            .iter()
            .map(|d| (d.department, d.status))
            .collect()
    }

    pub fn all_approved(&self) -> bool {
        self.departments
            .iter()
            .all(|d| d.status == ClearanceStatus::Approved)
    }
}

/// A department where the snapshot disagrees with the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    pub department: Department,
    pub derived: ClearanceStatus,
    pub snapshot: ClearanceStatus,
}

/// Per-department view from one subject's requests
pub fn derive_departments(requests: &[DecisionRequest]) -> Vec<DepartmentView> {
    Department::all()
        .map(|department| {
            let for_department = || requests.iter().filter(move |r| r.department == department);

            let latest_resolved = for_department()
                .filter(|r| r.resolution_seq.is_some())
                .max_by_key(|r| r.resolution_seq);

            match latest_resolved {
                Some(request) => DepartmentView {
                    department,
                    status: request.status,
                    request_id: Some(request.id.clone()),
                    requested: true,
                },
                None => {
                    let latest_pending = for_department().last();
                    DepartmentView {
                        department,
                        status: ClearanceStatus::Pending,
                        request_id: latest_pending.map(|r| r.id.clone()),
                        requested: latest_pending.is_some(),
                    }
                }
            }
        })
        .collect()
}

/// Status map from one subject's requests
pub fn derive_statuses(requests: &[DecisionRequest]) -> BTreeMap<Department, ClearanceStatus> {
    derive_departments(requests)
        .into_iter()
        .map(|d| (d.department, d.status))
        .collect()
}

/// Departments whose snapshot status differs from the derived one
pub fn diverging(
    snapshot: &Subject,
    derived: &BTreeMap<Department, ClearanceStatus>,
) -> Vec<Divergence> {
    Department::all()
        .filter_map(|department| {
            let derived = derived.get(&department).copied().unwrap_or_default();
            let snapshot = snapshot.status(department);
            (derived != snapshot).then_some(Divergence {
                department,
                derived,
                snapshot,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearance_core::Decision;

    fn resolved(department: Department, decision: Decision, seq: u64) -> DecisionRequest {
        let mut request = DecisionRequest::new("S1", department);
        request.resolve(decision, seq).unwrap();
        request
    }

    #[test]
    fn test_no_requests_means_not_requested() {
        let views = derive_departments(&[]);

        assert_eq!(views.len(), Department::count());
        for view in &views {
            assert_eq!(view.status, ClearanceStatus::Pending);
            assert!(!view.requested);
            assert_eq!(view.describe(), "no request sent yet");
        }
    }

    #[test]
    fn test_pending_request_is_awaiting() {
        let pending = DecisionRequest::new("S1", Department::Hostel);
        let views = derive_departments(std::slice::from_ref(&pending));

        let hostel = views.iter().find(|v| v.department == Department::Hostel).unwrap();
        assert!(hostel.requested);
        assert_eq!(hostel.status, ClearanceStatus::Pending);
        assert_eq!(hostel.request_id.as_deref(), Some(pending.id.as_str()));
        assert_eq!(hostel.describe(), "awaiting decision");
    }

    #[test]
    fn test_latest_resolution_is_authoritative() {
        let older = resolved(Department::Finance, Decision::Rejected, 3);
        let newer = resolved(Department::Finance, Decision::Approved, 9);
        let still_pending = DecisionRequest::new("S1", Department::Finance);

        // Order in the slice does not matter, only resolution order
        let statuses = derive_statuses(&[newer.clone(), still_pending, older]);
        assert_eq!(statuses[&Department::Finance], ClearanceStatus::Approved);

        let views = derive_departments(&[newer.clone()]);
        assert_eq!(views[0].request_id.as_deref(), Some(newer.id.as_str()));
    }

    #[test]
    fn test_diverging_reports_mismatch() {
        let mut subject = Subject::new("S1", "Ada Obi", "ada@example.edu");
        let derived = derive_statuses(&[resolved(Department::Library, Decision::Approved, 1)]);

        let divergences = diverging(&subject, &derived);
        assert_eq!(
            divergences,
            vec![Divergence {
                department: Department::Library,
                derived: ClearanceStatus::Approved,
                snapshot: ClearanceStatus::Pending,
            }]
        );

        subject
            .status_by_department
            .insert(Department::Library, ClearanceStatus::Approved);
        assert!(diverging(&subject, &derived).is_empty());
    }
}
