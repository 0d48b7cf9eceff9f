//! Clearance status and terminal decisions

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of one department's clearance for a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearanceStatus {
    /// No decision yet (also the state before any request exists)
    #[default]
    Pending,
    /// Department signed off
    Approved,
    /// Department refused
    Rejected,
}

impl ClearanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClearanceStatus::Pending => "pending",
            ClearanceStatus::Approved => "approved",
            ClearanceStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim() {
            "pending" => Ok(ClearanceStatus::Pending),
            "approved" => Ok(ClearanceStatus::Approved),
            "rejected" => Ok(ClearanceStatus::Rejected),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }

    /// Approved or rejected
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClearanceStatus::Pending)
    }
}

impl fmt::Display for ClearanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A department's terminal decision on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        ClearanceStatus::from(*self).as_str()
    }

    /// Parse a decision; anything other than the two terminal values is
    /// `InvalidDecision` (including "pending")
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim() {
            "approved" => Ok(Decision::Approved),
            "rejected" => Ok(Decision::Rejected),
            other => Err(CoreError::InvalidDecision(other.to_string())),
        }
    }
}

impl From<Decision> for ClearanceStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => ClearanceStatus::Approved,
            Decision::Rejected => ClearanceStatus::Rejected,
        }
    }
}

impl TryFrom<ClearanceStatus> for Decision {
    type Error = CoreError;

    fn try_from(status: ClearanceStatus) -> Result<Self, Self::Error> {
        match status {
            ClearanceStatus::Approved => Ok(Decision::Approved),
            ClearanceStatus::Rejected => Ok(Decision::Rejected),
            ClearanceStatus::Pending => Err(CoreError::InvalidDecision("pending".to_string())),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_is_pending() {
        assert_eq!(ClearanceStatus::default(), ClearanceStatus::Pending);
        assert!(!ClearanceStatus::Pending.is_terminal());
        assert!(ClearanceStatus::Approved.is_terminal());
        assert!(ClearanceStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ClearanceStatus::parse("approved"), Ok(ClearanceStatus::Approved));
        assert!(matches!(
            ClearanceStatus::parse("done"),
            Err(CoreError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_decision_rejects_pending() {
        assert_eq!(
            Decision::parse("pending"),
            Err(CoreError::InvalidDecision("pending".to_string()))
        );
        assert!(Decision::parse("maybe").is_err());
        assert_eq!(Decision::parse("rejected"), Ok(Decision::Rejected));
    }

    #[test]
    fn test_decision_status_conversion() {
        assert_eq!(ClearanceStatus::from(Decision::Approved), ClearanceStatus::Approved);
        assert_eq!(Decision::try_from(ClearanceStatus::Rejected), Ok(Decision::Rejected));
        assert!(Decision::try_from(ClearanceStatus::Pending).is_err());
    }
}
