use crate::error::WorkflowError;
use async_trait::async_trait;
use menuforge_model::StageId;

/// The uniform shape every pipeline step implements.
///
/// Each stage turns a typed input into a typed output or a typed error.
/// The orchestrator wires concrete stage types together through an
/// explicit sequence, so the compiler checks the cross-stage data
/// contracts; there is no dynamic dispatch between stages.
///
/// Stages are pure with respect to workflow state: they never see or
/// mutate `WorkflowState`. Deadlines and cancellation are applied around
/// `run` by the orchestrator.
#[async_trait]
pub trait Stage: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;
    type Error: Into<WorkflowError> + Send + 'static;

    /// The identifier recorded in history entries and logs.
    fn id(&self) -> StageId;

    /// Execute the transformation.
    async fn run(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}
