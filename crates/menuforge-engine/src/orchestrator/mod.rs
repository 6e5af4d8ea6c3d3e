//! Workflow orchestration.
//!
//! The orchestrator owns the [`WorkflowState`] and drives the fixed stage
//! sequence Extracting → Structuring → Designing → Generating →
//! Validating, with the single bounded Validating → Generating rewind.
//! It applies the per-stage deadline and the cancellation signal around
//! every stage invocation and hands the final record to the store at
//! termination.

mod handle;

pub use handle::OrchestratorHandle;

use crate::error::WorkflowError;
use crate::stage::Stage;
use crate::stages::{
    Designer, DesignerInput, Extractor, Generator, GeneratorInput, Structurer, Validator,
    ValidatorInput,
};
use menuforge_config::Config;
use menuforge_llm::LlmClient;
use menuforge_model::{
    CodeArtifact, DesignSpec, MenuDocument, StructuredMenu, TransitionOutcome, ValidationReport,
    WorkflowState, WorkflowStatus,
};
use menuforge_pdf::PdfTextExtractor;
use menuforge_store::{CodeArtifactStore, WorkflowRecord};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// The external collaborators a workflow depends on. Trait objects so
/// tests substitute scripted doubles for all three.
pub struct Collaborators {
    pub extractor: Arc<dyn PdfTextExtractor>,
    pub llm: Arc<dyn LlmClient>,
    pub store: Arc<dyn CodeArtifactStore>,
}

/// Everything produced by a workflow that ran to completion.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub menu: StructuredMenu,
    pub design: DesignSpec,
    pub artifact: CodeArtifact,
    pub report: ValidationReport,
    pub state: WorkflowState,
}

/// Products accumulated as the pipeline advances, persisted even when a
/// later stage fails.
#[derive(Default)]
struct RunProducts {
    menu: Option<StructuredMenu>,
    design: Option<DesignSpec>,
    artifact: Option<CodeArtifact>,
}

pub struct Orchestrator {
    config: Config,
    extractor: Extractor,
    structurer: Structurer,
    designer: Designer,
    generator: Generator,
    validator: Validator,
    store: Arc<dyn CodeArtifactStore>,
    cancel: watch::Receiver<bool>,
}

impl Orchestrator {
    /// An orchestrator without an external cancellation source.
    #[must_use]
    pub fn new(config: Config, collaborators: Collaborators) -> Self {
        let (_tx, rx) = watch::channel(false);
        Self::with_cancellation(config, collaborators, rx)
    }

    /// An orchestrator cancelled when `cancel` observes `true`.
    #[must_use]
    pub fn with_cancellation(
        config: Config,
        collaborators: Collaborators,
        cancel: watch::Receiver<bool>,
    ) -> Self {
        let model = config.llm.model.clone();
        let max_tokens = config.llm.max_tokens;
        Self {
            extractor: Extractor::new(collaborators.extractor),
            structurer: Structurer::new(Arc::clone(&collaborators.llm), model.clone()),
            designer: Designer::new(Arc::clone(&collaborators.llm), model.clone()),
            generator: Generator::new(collaborators.llm, model, max_tokens),
            validator: Validator,
            store: collaborators.store,
            config,
            cancel,
        }
    }

    /// Run one workflow to termination and persist its record.
    ///
    /// Always leaves the state terminal: Succeeded on a clean validation,
    /// Cancelled when the cancellation signal interrupted a stage, Failed
    /// for every other error.
    pub async fn run(&self, document: MenuDocument) -> Result<WorkflowOutcome, WorkflowError> {
        let mut state = WorkflowState::new(self.config.workflow.max_retries);
        let mut products = RunProducts::default();
        info!(workflow = %state.id(), filename = %document.filename, "workflow started");

        let result = self.drive(&mut state, &mut products, document).await;

        let status = match &result {
            Ok(_) => WorkflowStatus::Succeeded,
            Err(WorkflowError::Cancelled { .. }) => WorkflowStatus::Cancelled,
            Err(_) => WorkflowStatus::Failed,
        };
        if let Err(invariant) = state.finish(status) {
            warn!(workflow = %state.id(), error = %invariant, "could not finalize status");
        }
        info!(workflow = %state.id(), status = %state.status(), "workflow terminated");

        let record = WorkflowRecord {
            menu: products.menu,
            design: products.design,
            artifact: products.artifact,
            state: state.clone(),
        };

        match result {
            Ok(report) => {
                // A success the caller cannot retrieve later is a failure.
                self.store.save(&record).await?;
                Ok(WorkflowOutcome {
                    menu: take_product(record.menu)?,
                    design: take_product(record.design)?,
                    artifact: take_product(record.artifact)?,
                    report,
                    state,
                })
            }
            Err(error) => {
                if let Err(store_error) = self.store.save(&record).await {
                    warn!(workflow = %state.id(), error = %store_error, "could not persist failed workflow");
                }
                Err(error)
            }
        }
    }

    /// The stage sequence proper, up to but not including finalization.
    async fn drive(
        &self,
        state: &mut WorkflowState,
        products: &mut RunProducts,
        document: MenuDocument,
    ) -> Result<ValidationReport, WorkflowError> {
        let brief = document.design_brief.clone();

        let text = self.run_stage(state, &self.extractor, document).await?;
        let menu = self.run_stage(state, &self.structurer, text).await?;
        products.menu = Some(menu.clone());

        let design = self
            .run_stage(
                state,
                &self.designer,
                DesignerInput {
                    menu: menu.clone(),
                    brief,
                },
            )
            .await?;
        products.design = Some(design.clone());

        let mut prior: Option<CodeArtifact> = None;
        let mut last_report: Option<ValidationReport> = None;
        let mut previous_blocking: Option<usize> = None;
        loop {
            let artifact = self
                .run_stage(
                    state,
                    &self.generator,
                    GeneratorInput {
                        menu: menu.clone(),
                        design: design.clone(),
                        prior: prior.take(),
                        report: last_report.take(),
                    },
                )
                .await?;
            products.artifact = Some(artifact.clone());

            let report = self
                .run_stage(
                    state,
                    &self.validator,
                    ValidatorInput {
                        artifact: artifact.clone(),
                        menu: menu.clone(),
                        design: design.clone(),
                    },
                )
                .await?;

            if report.is_clean() {
                return Ok(report);
            }
            if !state.can_retry() {
                return Err(WorkflowError::ValidationExhausted {
                    attempts: state.retry_count() + 1,
                    report,
                });
            }
            if previous_blocking.is_some_and(|p| report.blocking_count() >= p) {
                warn!(
                    workflow = %state.id(),
                    blocking = report.blocking_count(),
                    "regeneration did not reduce blocking findings"
                );
            }
            previous_blocking = Some(report.blocking_count());
            state.record_retry()?;
            info!(
                workflow = %state.id(),
                retry = state.retry_count(),
                blocking = report.blocking_count(),
                "regenerating after blocking findings"
            );
            prior = Some(artifact);
            last_report = Some(report);
        }
    }

    /// Run one stage under the workflow's deadline and cancellation
    /// signal, recording the history entry either way.
    async fn run_stage<S: Stage>(
        &self,
        state: &mut WorkflowState,
        stage: &S,
        input: S::Input,
    ) -> Result<S::Output, WorkflowError> {
        let id = stage.id();
        let deadline = self.config.workflow.stage_timeout();
        state.begin_stage(id)?;

        let mut cancel = self.cancel.clone();
        let outcome = tokio::select! {
            () = wait_cancelled(&mut cancel) => {
                state.finish_stage(TransitionOutcome::Cancelled);
                return Err(WorkflowError::Cancelled { stage: id });
            }
            outcome = tokio::time::timeout(deadline, stage.run(input)) => outcome,
        };

        match outcome {
            Ok(Ok(output)) => {
                state.finish_stage(TransitionOutcome::Completed);
                Ok(output)
            }
            Ok(Err(error)) => {
                let error = error.into();
                state.finish_stage(TransitionOutcome::Failed {
                    reason: error.to_string(),
                });
                Err(error)
            }
            Err(_) => {
                state.finish_stage(TransitionOutcome::TimedOut);
                Err(WorkflowError::Timeout {
                    stage: id,
                    elapsed: deadline,
                })
            }
        }
    }
}

/// Resolve when the cancellation signal fires. Never resolves if the
/// sender is dropped, so an orchestrator without an external source runs
/// unimpeded.
async fn wait_cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn take_product<T>(product: Option<T>) -> Result<T, WorkflowError> {
    product.ok_or_else(|| WorkflowError::Internal("workflow product missing after success".into()))
}
