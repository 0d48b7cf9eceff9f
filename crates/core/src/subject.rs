//! Subject - a student progressing through clearance

use crate::department::Department;
use crate::status::ClearanceStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A registered subject and its per-department status snapshot
///
/// `status_by_department` is total over [`Department::all`]: every department
/// has an entry from registration onwards. `artifact_issued` only ever moves
/// from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Opaque identifier (e.g. matriculation number)
    pub id: String,

    /// Display name
    pub name: String,

    /// Contact address for notifications
    pub contact: String,

    /// Cached view of the latest resolution per department
    pub status_by_department: BTreeMap<Department, ClearanceStatus>,

    /// Whether the clearance certificate has been triggered
    pub artifact_issued: bool,

    /// When the subject was registered
    pub registered_at: DateTime<Utc>,
}

impl Subject {
    /// Create a subject with every department pending
    pub fn new(id: impl Into<String>, name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            contact: contact.into(),
            status_by_department: pending_statuses(),
            artifact_issued: false,
            registered_at: Utc::now(),
        }
    }

    /// Current snapshot status for a department
    pub fn status(&self, department: Department) -> ClearanceStatus {
        self.status_by_department
            .get(&department)
            .copied()
            .unwrap_or_default()
    }

    /// True when every department in the fixed set is approved
    pub fn all_approved(&self) -> bool {
        Department::all().all(|d| self.status(d) == ClearanceStatus::Approved)
    }

    /// Departments that have not approved yet
    pub fn outstanding(&self) -> Vec<Department> {
        Department::all()
            .filter(|d| self.status(*d) != ClearanceStatus::Approved)
            .collect()
    }
}

/// A status map with every department pending
pub fn pending_statuses() -> BTreeMap<Department, ClearanceStatus> {
    Department::all()
        .map(|d| (d, ClearanceStatus::Pending))
        .collect()
}
