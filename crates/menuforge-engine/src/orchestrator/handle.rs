use crate::error::WorkflowError;
use crate::orchestrator::{Collaborators, Orchestrator, WorkflowOutcome};
use menuforge_config::Config;
use menuforge_model::MenuDocument;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A workflow running on its own task, with a cancellation lever.
///
/// Cancellation is cooperative: the running stage is abandoned at the
/// next await point, the state is finalized as Cancelled and the record
/// is still persisted.
pub struct OrchestratorHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<Result<WorkflowOutcome, WorkflowError>>,
}

impl OrchestratorHandle {
    /// Spawn a workflow for `document` on the current runtime.
    #[must_use]
    pub fn spawn(config: Config, collaborators: Collaborators, document: MenuDocument) -> Self {
        let (cancel, rx) = watch::channel(false);
        let orchestrator = Orchestrator::with_cancellation(config, collaborators, rx);
        let task = tokio::spawn(async move { orchestrator.run(document).await });
        Self { cancel, task }
    }

    /// Signal cancellation. Safe to call more than once and after the
    /// workflow has already terminated.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Wait for the workflow to terminate.
    pub async fn join(self) -> Result<WorkflowOutcome, WorkflowError> {
        match self.task.await {
            Ok(result) => result,
            Err(join_error) => Err(WorkflowError::Internal(format!(
                "workflow task failed: {join_error}"
            ))),
        }
    }
}
