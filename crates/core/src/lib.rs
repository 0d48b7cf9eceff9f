//! Clearance Core - Domain types
//!
//! This crate contains the vocabulary shared by every clearance crate:
//! - `Department`: the closed set of approving departments
//! - `ClearanceStatus` / `Decision`: per-department state and terminal decisions
//! - `Subject`: a registered student with its per-department status snapshot
//! - `DecisionRequest`: one approval ask for a (subject, department) pair

pub mod department;
pub mod error;
pub mod request;
pub mod status;
pub mod subject;

pub use department::Department;
pub use error::CoreError;
pub use request::DecisionRequest;
pub use status::{ClearanceStatus, Decision};
pub use subject::Subject;
