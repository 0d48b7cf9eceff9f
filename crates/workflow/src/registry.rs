//! Subject registry - one record per subject, one lock per record

use std::sync::Arc;

use clearance_core::Subject;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::error::{ClearanceError, ClearanceResult};

/// Shared handle to one subject's record
pub(crate) type SubjectHandle = Arc<Mutex<Subject>>;

/// Registry of subjects
///
/// Records are sharded across a `DashMap`; each record has its own mutex so
/// mutations of different subjects never contend. Callers outside this crate
/// only ever see snapshots (clones); status mutation is reserved for the
/// aggregation engine.
#[derive(Default)]
pub struct SubjectRegistry {
    subjects: DashMap<String, SubjectHandle>,
}

impl SubjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subject with every department pending
    pub fn register(
        &self,
        id: &str,
        name: &str,
        contact: &str,
    ) -> ClearanceResult<Subject> {
        self.insert(Subject::new(id, name, contact))
    }

    /// Insert a recorded subject (used when restoring from a journal)
    ///
    /// Only the identity fields and the registration time are taken over;
    /// statuses start pending and `artifact_issued` false. The aggregation
    /// engine rebuilds them from the ledger.
    pub fn insert(&self, recorded: Subject) -> ClearanceResult<Subject> {
        let mut subject = Subject::new(recorded.id, recorded.name, recorded.contact);
        subject.registered_at = recorded.registered_at;

        match self.subjects.entry(subject.id.clone()) {
            Entry::Occupied(_) => Err(ClearanceError::DuplicateSubject(subject.id)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(subject.clone())));
                tracing::info!(subject_id = %subject.id, "Subject registered");
                Ok(subject)
            }
        }
    }

    /// Snapshot of a subject
    pub fn find(&self, id: &str) -> ClearanceResult<Subject> {
        let handle = self.handle(id)?;
        let subject = handle.lock().clone();
        Ok(subject)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.subjects.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Identifiers of every registered subject, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.subjects.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Lock handle for a subject
    ///
    /// The map guard is released before the handle is returned, so holding the
    /// subject's lock never blocks other shards.
    pub(crate) fn handle(&self, id: &str) -> ClearanceResult<SubjectHandle> {
        self.subjects
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ClearanceError::SubjectNotFound(id.to_string()))
    }
}
