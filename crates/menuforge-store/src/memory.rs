use crate::record::{ArtifactSummary, WorkflowRecord};
use crate::{CodeArtifactStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory store for tests and embedded use.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<Uuid, (WorkflowRecord, DateTime<Utc>)>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, for test assertions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().expect("store poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CodeArtifactStore for InMemoryStore {
    async fn save(&self, record: &WorkflowRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("store poisoned")
            .insert(record.state.id(), (record.clone(), Utc::now()));
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<WorkflowRecord, StoreError> {
        self.records
            .lock()
            .expect("store poisoned")
            .get(&id)
            .map(|(record, _)| record.clone())
            .ok_or(StoreError::NotFound { id })
    }

    async fn list(&self) -> Result<Vec<ArtifactSummary>, StoreError> {
        let mut summaries: Vec<ArtifactSummary> = self
            .records
            .lock()
            .expect("store poisoned")
            .values()
            .map(|(record, saved_at)| record.summary(*saved_at))
            .collect();
        summaries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(summaries)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("store poisoned")
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { id })
    }
}
