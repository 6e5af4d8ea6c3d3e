//! menuforge: menu documents in, generated restaurant websites out.
//!
//! The pipeline runs a fixed stage sequence over each submitted document:
//! text extraction, menu structuring, design token selection, site code
//! generation and static validation, with a bounded generate-validate
//! correction loop. This crate re-exports the public surface of the
//! workspace crates and hosts the command-line interface.
//!
//! ```no_run
//! use menuforge::{Collaborators, Config, MenuDocument, Orchestrator};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let collaborators = Collaborators {
//!     extractor: Arc::new(menuforge::PlainTextExtractor),
//!     llm: menuforge::llm_from_config(&config.llm)?,
//!     store: Arc::new(menuforge::InMemoryStore::new()),
//! };
//! let orchestrator = Orchestrator::new(config, collaborators);
//! let document = MenuDocument::new("menu.txt", b"MAINS\nLasagna 14.50".to_vec());
//! let outcome = orchestrator.run(document).await?;
//! println!("{} files generated", outcome.artifact.file_count());
//! # Ok(())
//! # }
//! ```

pub mod cli;

/// Run one workflow to termination: convenience over building an
/// [`Orchestrator`] by hand.
pub async fn submit(
    document: MenuDocument,
    config: Config,
    collaborators: Collaborators,
) -> Result<WorkflowOutcome, WorkflowError> {
    Orchestrator::new(config, collaborators).run(document).await
}

pub use menuforge_config::{Config, ConfigError, LlmConfig, StoreConfig, WorkflowConfig};
pub use menuforge_engine::{
    Collaborators, DesignerError, GenerationError, Orchestrator, OrchestratorHandle, Stage,
    StructuringError, WorkflowError, WorkflowOutcome,
};
pub use menuforge_llm::{
    from_config as llm_from_config, Completion, CompletionRequest, LlmClient, LlmError,
    OpenAiClient, ScriptedClient,
};
pub use menuforge_model::{
    CodeArtifact, DesignSpec, ExtractedText, Issue, MenuCategory, MenuDocument, MenuItem,
    Palette, RestaurantInfo, Severity, Spacing, StageId, StageTransition, StructuredMenu,
    TextBlock, TransitionOutcome, Typography, ValidationReport, WorkflowState, WorkflowStatus,
};
pub use menuforge_pdf::{ExtractionError, PdfTextExtractor, PlainTextExtractor};
pub use menuforge_store::{
    ArtifactSummary, CodeArtifactStore, FsStore, InMemoryStore, StoreError, WorkflowRecord,
};
