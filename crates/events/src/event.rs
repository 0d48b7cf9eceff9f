//! Journal event types

use chrono::{DateTime, Utc};
use clearance_core::{DecisionRequest, Subject};
use serde::{Deserialize, Serialize};

/// One accepted command, as recorded in the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClearanceEvent {
    /// A subject was registered (snapshot at registration, all pending)
    SubjectRegistered {
        timestamp: DateTime<Utc>,
        subject: Subject,
    },
    /// A pending request was opened
    RequestSubmitted {
        timestamp: DateTime<Utc>,
        request: DecisionRequest,
    },
    /// A request was resolved; carries the request after the transition.
    /// Written before any notification or certificate generation runs.
    RequestResolved {
        timestamp: DateTime<Utc>,
        request: DecisionRequest,
        /// This decision completed the approval set and flipped the issued flag
        #[serde(default)]
        cleared: bool,
    },
}

impl ClearanceEvent {
    pub fn subject_registered(subject: Subject) -> Self {
        Self::SubjectRegistered {
            timestamp: Utc::now(),
            subject,
        }
    }

    pub fn request_submitted(request: DecisionRequest) -> Self {
        Self::RequestSubmitted {
            timestamp: Utc::now(),
            request,
        }
    }

    pub fn request_resolved(request: DecisionRequest, cleared: bool) -> Self {
        Self::RequestResolved {
            timestamp: Utc::now(),
            request,
            cleared,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SubjectRegistered { timestamp, .. }
            | Self::RequestSubmitted { timestamp, .. }
            | Self::RequestResolved { timestamp, .. } => *timestamp,
        }
    }

    pub fn subject_id(&self) -> &str {
        match self {
            Self::SubjectRegistered { subject, .. } => &subject.id,
            Self::RequestSubmitted { request, .. } | Self::RequestResolved { request, .. } => {
                &request.subject_id
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::SubjectRegistered { .. } => "subject_registered",
            Self::RequestSubmitted { .. } => "request_submitted",
            Self::RequestResolved { .. } => "request_resolved",
        }
    }
}
