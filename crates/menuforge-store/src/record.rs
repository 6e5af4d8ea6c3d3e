use chrono::{DateTime, Utc};
use menuforge_model::{CodeArtifact, DesignSpec, StructuredMenu, WorkflowState, WorkflowStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything persisted for one request: the intermediate products plus
/// the final workflow state snapshot.
///
/// Early failures leave the product fields `None`; the state snapshot is
/// always present so terminated workflows are never left non-terminal in
/// the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub menu: Option<StructuredMenu>,
    pub design: Option<DesignSpec>,
    pub artifact: Option<CodeArtifact>,
    pub state: WorkflowState,
}

impl WorkflowRecord {
    #[must_use]
    pub fn new(state: WorkflowState) -> Self {
        Self {
            menu: None,
            design: None,
            artifact: None,
            state,
        }
    }

    /// blake3 hash over the artifact's files in path order, or `None`
    /// when no artifact was produced.
    #[must_use]
    pub fn content_hash(&self) -> Option<String> {
        let artifact = self.artifact.as_ref()?;
        let mut hasher = blake3::Hasher::new();
        for (path, content) in &artifact.files {
            hasher.update(path.as_bytes());
            hasher.update(&[0]);
            hasher.update(content.as_bytes());
            hasher.update(&[0]);
        }
        Some(hasher.finalize().to_hex().to_string())
    }

    #[must_use]
    pub fn summary(&self, saved_at: DateTime<Utc>) -> ArtifactSummary {
        ArtifactSummary {
            id: self.state.id(),
            restaurant_name: self.menu.as_ref().map(|m| m.restaurant_name.clone()),
            file_count: self.artifact.as_ref().map_or(0, CodeArtifact::file_count),
            status: self.state.status(),
            content_hash: self.content_hash(),
            saved_at,
        }
    }
}

/// One row of `CodeArtifactStore::list()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub id: Uuid,
    pub restaurant_name: Option<String>,
    pub file_count: usize,
    pub status: WorkflowStatus,
    pub content_hash: Option<String>,
    pub saved_at: DateTime<Utc>,
}
