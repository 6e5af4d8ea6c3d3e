//! Workflow engine for menuforge
//!
//! Turns a menu document into a generated website through a fixed stage
//! sequence with typed hand-offs: extraction, structuring, design, code
//! generation and validation, with a bounded generate-validate correction
//! loop. The orchestrator owns the workflow state; stages are pure
//! transformations over their typed inputs.

pub mod error;
mod orchestrator;
pub mod prompts;
pub mod routes;
mod stage;
pub mod stages;

pub use error::{DesignerError, GenerationError, StructuringError, WorkflowError};
pub use orchestrator::{Collaborators, Orchestrator, OrchestratorHandle, WorkflowOutcome};
pub use stage::Stage;
