//! Clearance RPC - CLI orchestrator
//!
//! This crate provides the `clearance` binary, the journal-backed application
//! context and the reference collaborators used outside of tests.

pub mod collaborators;
pub mod commands;
pub mod context;

pub use collaborators::{CertificateWriter, LogNotifier};
pub use context::{AppContext, ContextError};
