use crate::record::{ArtifactSummary, WorkflowRecord};
use crate::{CodeArtifactStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const RECORD_FILE: &str = "record.json";
const MANIFEST_FILE: &str = "manifest.json";
const SITE_DIR: &str = "site";

/// Filesystem store: one directory per workflow id.
///
/// ```text
/// <root>/<id>/record.json    full WorkflowRecord
/// <root>/<id>/manifest.json  ArtifactSummary (incl. blake3 content hash)
/// <root>/<id>/site/...       generated files, ready to serve or build
/// ```
///
/// The record is the source of truth; the site directory is a convenience
/// rendering of the artifact's file map.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    fn record_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }

    fn write_site_files(&self, dir: &Path, record: &WorkflowRecord) -> Result<(), StoreError> {
        let Some(artifact) = &record.artifact else {
            return Ok(());
        };
        let site_root = dir.join(SITE_DIR);
        for (rel, content) in &artifact.files {
            let Some(target) = safe_join(&site_root, rel) else {
                // Generated paths are validated upstream; a traversal here
                // means a corrupted artifact, so skip rather than write
                // outside the store root.
                warn!(path = %rel, "skipping artifact file with unsafe path");
                continue;
            };
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
            std::fs::write(&target, content).map_err(|source| StoreError::Io {
                path: target.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Join a relative artifact path onto `root`, rejecting absolute paths and
/// any `..` component.
fn safe_join(root: &Path, rel: &str) -> Option<PathBuf> {
    let rel_path = Path::new(rel);
    if rel_path.is_absolute() {
        return None;
    }
    let mut out = root.to_path_buf();
    for component in rel_path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(out)
}

#[async_trait]
impl CodeArtifactStore for FsStore {
    async fn save(&self, record: &WorkflowRecord) -> Result<(), StoreError> {
        let dir = self.record_dir(record.state.id());
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let record_json = serde_json::to_vec_pretty(record)?;
        let record_path = dir.join(RECORD_FILE);
        std::fs::write(&record_path, record_json).map_err(|source| StoreError::Io {
            path: record_path.display().to_string(),
            source,
        })?;

        let manifest = record.summary(Utc::now());
        let manifest_path = dir.join(MANIFEST_FILE);
        std::fs::write(&manifest_path, serde_json::to_vec_pretty(&manifest)?).map_err(|source| {
            StoreError::Io {
                path: manifest_path.display().to_string(),
                source,
            }
        })?;

        self.write_site_files(&dir, record)?;
        debug!(id = %record.state.id(), dir = %dir.display(), "persisted workflow record");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<WorkflowRecord, StoreError> {
        let path = self.record_dir(id).join(RECORD_FILE);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { id })
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn list(&self) -> Result<Vec<ArtifactSummary>, StoreError> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| StoreError::Io {
            path: self.root.display().to_string(),
            source,
        })?;

        let mut summaries = Vec::new();
        for entry in entries.flatten() {
            let manifest_path = entry.path().join(MANIFEST_FILE);
            let Ok(raw) = std::fs::read(&manifest_path) else {
                continue; // not a record directory
            };
            match serde_json::from_slice::<ArtifactSummary>(&raw) {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!(path = %manifest_path.display(), error = %e, "skipping corrupt manifest"),
            }
        }
        summaries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(summaries)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let dir = self.record_dir(id);
        if !dir.is_dir() {
            return Err(StoreError::NotFound { id });
        }
        std::fs::remove_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.display().to_string(),
            source,
        })
    }
}
