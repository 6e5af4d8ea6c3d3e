//! Error taxonomy for the workflow engine
//!
//! Every stage has its own error type; [`WorkflowError`] rolls them up and
//! names the failing stage. The propagation policy is uniform: every error
//! is terminal except blocking validation findings, which drive the
//! bounded retry loop and only surface as
//! [`WorkflowError::ValidationExhausted`] once the budget is spent.

use menuforge_llm::LlmError;
use menuforge_model::{ArtifactError, StageId, StateError, ValidationReport};
use menuforge_pdf::ExtractionError;
use menuforge_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Structurer stage failures: the LLM reply could not be coerced into a
/// valid `StructuredMenu`.
#[derive(Error, Debug)]
pub enum StructuringError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("structurer reply is not valid menu JSON: {0}")]
    Malformed(String),

    #[error("structured menu has no categories")]
    EmptyMenu,

    #[error("item '{item}' has an unusable price '{raw}'")]
    InvalidPrice { item: String, raw: String },
}

/// Designer stage failures. The designer is never retried; any of these
/// ends the workflow.
#[derive(Error, Debug)]
pub enum DesignerError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("designer reply is not valid design JSON: {0}")]
    Malformed(String),

    #[error("design token '{token}' is not a hex color: '{value}'")]
    InvalidColor { token: String, value: String },
}

/// Generator stage failures: collaborator failure or structurally invalid
/// output.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("generator reply is not valid artifact JSON: {0}")]
    Malformed(String),

    #[error("generated file path '{path}' escapes the artifact root")]
    UnsafePath { path: String },

    #[error("generated artifact is structurally invalid: {0}")]
    InvalidArtifact(#[from] ArtifactError),
}

/// Terminal outcome of a failed workflow, naming the failing stage.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("extracting failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("structuring failed: {0}")]
    Structuring(#[from] StructuringError),

    #[error("designing failed: {0}")]
    Design(#[from] DesignerError),

    #[error("generating failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("validation still blocking after {attempts} generator attempt(s): {} blocking issue(s)", report.blocking_count())]
    ValidationExhausted {
        attempts: u32,
        report: ValidationReport,
    },

    #[error("{stage} timed out after {}s", elapsed.as_secs())]
    Timeout { stage: StageId, elapsed: Duration },

    #[error("workflow cancelled during {stage}")]
    Cancelled { stage: StageId },

    #[error("failed to persist workflow record: {0}")]
    Store(#[from] StoreError),

    #[error("workflow state invariant violated: {0}")]
    Invariant(#[from] StateError),

    #[error("workflow infrastructure failure: {0}")]
    Internal(String),
}

impl WorkflowError {
    /// The stage this error is attributed to, when one applies.
    #[must_use]
    pub fn stage(&self) -> Option<StageId> {
        match self {
            Self::Extraction(_) => Some(StageId::Extracting),
            Self::Structuring(_) => Some(StageId::Structuring),
            Self::Design(_) => Some(StageId::Designing),
            Self::Generation(_) => Some(StageId::Generating),
            Self::ValidationExhausted { .. } => Some(StageId::Validating),
            Self::Timeout { stage, .. } | Self::Cancelled { stage } => Some(*stage),
            Self::Store(_) | Self::Invariant(_) | Self::Internal(_) => None,
        }
    }

    /// The final validation report, present only after retry exhaustion.
    #[must_use]
    pub fn last_report(&self) -> Option<&ValidationReport> {
        match self {
            Self::ValidationExhausted { report, .. } => Some(report),
            _ => None,
        }
    }
}

// The validator produces a report for any artifact; it has no error path.
impl From<std::convert::Infallible> for WorkflowError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuforge_model::Issue;

    #[test]
    fn errors_name_their_stage() {
        let err = WorkflowError::Extraction(ExtractionError::Encrypted);
        assert_eq!(err.stage(), Some(StageId::Extracting));

        let err = WorkflowError::Timeout {
            stage: StageId::Generating,
            elapsed: Duration::from_secs(60),
        };
        assert_eq!(err.stage(), Some(StageId::Generating));
        assert!(err.to_string().contains("generating"));
    }

    #[test]
    fn exhaustion_carries_the_final_report() {
        let report = ValidationReport::new(vec![Issue::blocking("src/App.jsx", "missing route")]);
        let err = WorkflowError::ValidationExhausted {
            attempts: 4,
            report,
        };
        assert_eq!(err.stage(), Some(StageId::Validating));
        assert_eq!(err.last_report().unwrap().blocking_count(), 1);
        assert!(err.to_string().contains("4 generator attempt(s)"));
    }
}
