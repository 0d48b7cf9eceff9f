//! Clearance Workflow
//!
//! Multi-department approval state machine for student clearance.
//!
//! ```text
//! submit ──► DecisionLedger (pending request)
//!                 │
//! resolve ────────┤  per-subject critical section
//!                 ▼
//!          ┌──────────────────────────────┐
//!          │ ledger CAS pending → decided │
//!          │ snapshot[dept] = decision    │
//!          │ all approved && !issued?     │──► flip artifact_issued
//!          └──────────────────────────────┘
//!                 │ (lock released)
//!                 ▼
//!          IssuanceTrigger ──► ArtifactGenerator, Notifier
//! ```
//!
//! ## Key Components
//!
//! - [`registry::SubjectRegistry`] - one lock per subject, no registry-wide lock
//! - [`ledger::DecisionLedger`] - request log, source of truth per department
//! - [`engine::AggregationEngine`] - sole writer of the status snapshot
//! - [`issuance::IssuanceTrigger`] - fires once per subject on full approval
//! - [`workflow::ClearanceWorkflow`] - request surface used by callers

pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;
pub mod issuance;
pub mod ledger;
pub mod notify;
pub mod registry;
pub mod view;
pub mod workflow;

pub use collaborators::{
    ArtifactGenerator, ArtifactRef, CollaboratorError, Notifier, ScanCodeEncoder, ScanPayload,
};
pub use config::ClearanceConfig;
pub use engine::{AggregationEngine, Committed, Reconciliation, Resolution};
pub use error::{ClearanceError, ClearanceResult};
pub use issuance::{IssuanceOutcome, IssuanceTrigger};
pub use ledger::{DecisionLedger, LedgerStats, RequestFilter};
pub use notify::NotificationDispatcher;
pub use registry::SubjectRegistry;
pub use view::{DepartmentView, Divergence, StatusView};
pub use workflow::{ClearanceWorkflow, WorkflowBuilder};
