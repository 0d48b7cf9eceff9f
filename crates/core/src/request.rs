//! Decision requests - one approval ask per (subject, department)

use crate::department::Department;
use crate::error::CoreError;
use crate::status::{ClearanceStatus, Decision};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single approval request
///
/// Created `Pending`; moved exactly once to a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// Unique request identifier (`REQ-XXXXXXXXXXXX`)
    pub id: String,

    /// Subject the request belongs to (lookup key, not ownership)
    pub subject_id: String,

    /// Department asked to decide
    pub department: Department,

    /// Current status
    pub status: ClearanceStatus,

    /// When the request was submitted
    pub created_at: DateTime<Utc>,

    /// When the decision was recorded
    pub resolved_at: Option<DateTime<Utc>>,

    /// Position in the global resolution order; larger is more recent
    pub resolution_seq: Option<u64>,
}

impl DecisionRequest {
    /// Create a new pending request
    pub fn new(subject_id: impl Into<String>, department: Department) -> Self {
        let id = format!(
            "REQ-{}",
            uuid::Uuid::new_v4().simple().to_string()[..12].to_uppercase()
        );

        Self {
            id,
            subject_id: subject_id.into(),
            department,
            status: ClearanceStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
            resolution_seq: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ClearanceStatus::Pending
    }

    /// Move the request to a terminal status
    ///
    /// Fails with `AlreadyResolved` if the request is no longer pending; the
    /// request is left untouched in that case.
    pub fn resolve(&mut self, decision: Decision, resolution_seq: u64) -> Result<(), CoreError> {
        if !self.is_pending() {
            return Err(CoreError::AlreadyResolved {
                request_id: self.id.clone(),
                status: self.status,
            });
        }

        self.status = decision.into();
        self.resolved_at = Some(Utc::now());
        self.resolution_seq = Some(resolution_seq);
        Ok(())
    }
}
