//! Clearance Events - JSONL journal
//!
//! Every accepted command is appended as one JSON line to a file per day.
//! Replaying the journal in order restores the registry and the decision
//! ledger; subject snapshots are rebuilt from the ledger afterwards.

pub mod error;
pub mod event;
pub mod reader;
pub mod store;

pub use error::EventError;
pub use event::ClearanceEvent;
pub use reader::EventReader;
pub use store::EventStore;
