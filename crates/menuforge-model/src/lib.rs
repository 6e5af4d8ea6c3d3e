//! Data contracts shared across the menuforge pipeline
//!
//! Every value that crosses a stage boundary is defined here: the input
//! document, intermediate stage outputs, the generated artifact, validation
//! findings, and the durable per-request workflow state. Stages produce and
//! consume these types; only the orchestrator mutates `WorkflowState`.

mod artifact;
mod design;
mod document;
mod menu;
mod report;
mod stage;
mod state;

pub use artifact::{ArtifactError, CodeArtifact};
pub use design::{DesignSpec, Palette, Spacing, Typography};
pub use document::MenuDocument;
pub use menu::{ExtractedText, MenuCategory, MenuItem, RestaurantInfo, StructuredMenu, TextBlock};
pub use report::{Issue, Severity, ValidationReport};
pub use stage::StageId;
pub use state::{StageTransition, StateError, TransitionOutcome, WorkflowState, WorkflowStatus};
