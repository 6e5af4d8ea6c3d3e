//! Artifact persistence for menuforge
//!
//! The orchestrator hands every terminated workflow to a
//! [`CodeArtifactStore`]: the generated artifact (when one exists), the
//! structured menu and design spec, and the final state snapshot. Two
//! implementations ship here: [`InMemoryStore`] for tests and embedded
//! use, [`FsStore`] for durable on-disk persistence with a blake3 content
//! hash in each record's manifest.

mod fs;
mod memory;
mod record;

pub use fs::FsStore;
pub use memory::InMemoryStore;
pub use record::{ArtifactSummary, WorkflowRecord};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Failures from the persistence collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no stored workflow with id {id}")]
    NotFound { id: Uuid },

    #[error("store I/O failure at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stored record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persistence collaborator, keyed by workflow id.
///
/// Shared across concurrent workflow instances; implementations must be
/// safe under concurrent use.
#[async_trait]
pub trait CodeArtifactStore: Send + Sync {
    /// Persist the record for a terminated workflow, replacing any prior
    /// record with the same id.
    async fn save(&self, record: &WorkflowRecord) -> Result<(), StoreError>;

    /// Load a previously saved record.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no record has the given id.
    async fn load(&self, id: Uuid) -> Result<WorkflowRecord, StoreError>;

    /// Summaries of every stored record, newest first.
    async fn list(&self) -> Result<Vec<ArtifactSummary>, StoreError>;

    /// Delete a stored record.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no record has the given id.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
