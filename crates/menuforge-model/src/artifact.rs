use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Structural violations detected while assembling a [`CodeArtifact`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("artifact contains no files")]
    Empty,

    #[error("entry point '{entry}' is not present in the file map")]
    MissingEntry { entry: String },

    #[error("entry point path is empty")]
    EmptyEntryPath,
}

/// The generated website source: a file-path→content mapping with one
/// designated entry file.
///
/// Paths are forward-slash relative paths (`src/App.jsx`). The map is
/// ordered so serialized artifacts and content hashes are deterministic.
/// The single-entry-file invariant is checked at construction; a
/// deserialized artifact should be re-checked with [`CodeArtifact::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeArtifact {
    pub files: BTreeMap<String, String>,
    pub entry_point: String,
}

impl CodeArtifact {
    /// Assemble an artifact, enforcing the entry-file invariant.
    pub fn new(files: BTreeMap<String, String>, entry_point: impl Into<String>) -> Result<Self, ArtifactError> {
        let artifact = Self {
            files,
            entry_point: entry_point.into(),
        };
        artifact.verify()?;
        Ok(artifact)
    }

    /// Re-check the structural invariant (non-empty, entry file present).
    pub fn verify(&self) -> Result<(), ArtifactError> {
        if self.entry_point.trim().is_empty() {
            return Err(ArtifactError::EmptyEntryPath);
        }
        if self.files.is_empty() {
            return Err(ArtifactError::Empty);
        }
        if !self.files.contains_key(&self.entry_point) {
            return Err(ArtifactError::MissingEntry {
                entry: self.entry_point.clone(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn entry_content(&self) -> &str {
        // verify() guarantees presence; an empty default keeps this total
        // for artifacts built through deserialization.
        self.files.get(&self.entry_point).map_or("", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[(&str, &str)]) -> BTreeMap<String, String> {
        paths
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn accepts_artifact_with_present_entry() {
        let artifact =
            CodeArtifact::new(files(&[("src/index.js", "render()"), ("src/App.jsx", "app")]), "src/index.js")
                .unwrap();
        assert_eq!(artifact.file_count(), 2);
        assert_eq!(artifact.entry_content(), "render()");
    }

    #[test]
    fn rejects_missing_entry_file() {
        let err = CodeArtifact::new(files(&[("src/App.jsx", "app")]), "src/index.js").unwrap_err();
        assert_eq!(
            err,
            ArtifactError::MissingEntry {
                entry: "src/index.js".into()
            }
        );
    }

    #[test]
    fn rejects_empty_file_map_and_entry_path() {
        assert_eq!(
            CodeArtifact::new(BTreeMap::new(), "src/index.js").unwrap_err(),
            ArtifactError::Empty
        );
        assert_eq!(
            CodeArtifact::new(files(&[("a", "b")]), "  ").unwrap_err(),
            ArtifactError::EmptyEntryPath
        );
    }
}
