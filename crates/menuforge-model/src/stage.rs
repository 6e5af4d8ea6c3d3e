use serde::{Deserialize, Serialize};

/// Stage identifiers for the menu generation workflow.
///
/// Stages execute in a fixed order:
///
/// ```text
/// Extracting → Structuring → Designing → Generating ⇄ Validating
/// ```
///
/// The only cycle is Generating↔Validating, bounded by the configured
/// retry budget. All other transitions move strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageId {
    /// Raw text retrieval from the submitted document.
    Extracting,
    /// Segmentation of free text into categories and items.
    Structuring,
    /// Selection of palette, typography and layout tokens.
    Designing,
    /// Source tree generation for the single-page site.
    Generating,
    /// Artifact checks producing blocking/warning findings.
    Validating,
}

impl StageId {
    /// Canonical lowercase name used in logs, history entries and errors.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Extracting => "extracting",
            Self::Structuring => "structuring",
            Self::Designing => "designing",
            Self::Generating => "generating",
            Self::Validating => "validating",
        }
    }

    /// The stage that follows this one in the forward path.
    ///
    /// `Validating` has no static successor: the orchestrator decides
    /// between termination and a rewind to `Generating`.
    #[must_use]
    pub const fn next(&self) -> Option<StageId> {
        match self {
            Self::Extracting => Some(Self::Structuring),
            Self::Structuring => Some(Self::Designing),
            Self::Designing => Some(Self::Generating),
            Self::Generating => Some(Self::Validating),
            Self::Validating => None,
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
