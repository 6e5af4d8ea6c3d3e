use crate::stage::StageId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Terminal and in-flight status of one workflow instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl WorkflowStatus {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a recorded stage invocation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "detail")]
pub enum TransitionOutcome {
    Completed,
    Failed { reason: String },
    TimedOut,
    Cancelled,
}

/// One immutable history entry: a single invocation of a stage.
///
/// The Generating/Validating cycle produces one entry per attempt, so the
/// history doubles as an audit trail of the retry loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    pub stage: StageId,
    /// 1-based attempt number; greater than 1 only inside the
    /// Generating/Validating cycle.
    pub attempt: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcome: Option<TransitionOutcome>,
}

/// Violations of the workflow-state invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("illegal stage transition {from} → {to}")]
    IllegalTransition { from: String, to: String },

    #[error("retry budget exhausted: {retries} of {max_retries} retries used")]
    RetryBudgetExhausted { retries: u32, max_retries: u32 },

    #[error("workflow already terminal ({status})")]
    AlreadyTerminal { status: WorkflowStatus },
}

/// Durable, append-only record of one request's progress.
///
/// Owned exclusively by the orchestrator; stages never touch it. Transitions
/// move strictly forward except the bounded Generating↔Validating cycle,
/// and `retry_count` never exceeds `max_retries`. The final snapshot is
/// handed to the artifact store at termination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    id: Uuid,
    current: StageId,
    retry_count: u32,
    max_retries: u32,
    history: Vec<StageTransition>,
    status: WorkflowStatus,
}

impl WorkflowState {
    /// Start a fresh workflow at the Extracting stage.
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            current: StageId::Extracting,
            retry_count: 0,
            max_retries,
            history: Vec::new(),
            status: WorkflowStatus::Running,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn current_stage(&self) -> StageId {
        self.current
    }

    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    #[must_use]
    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    #[must_use]
    pub fn history(&self) -> &[StageTransition] {
        &self.history
    }

    /// Whether another Generating/Validating cycle is allowed.
    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }

    /// Record entry into a stage and append the matching history entry.
    ///
    /// Enforces the forward-only transition rule; the single legal rewind
    /// is Validating → Generating.
    pub fn begin_stage(&mut self, stage: StageId) -> Result<(), StateError> {
        if self.status.is_terminal() {
            return Err(StateError::AlreadyTerminal { status: self.status });
        }
        let legal = if self.history.is_empty() {
            stage == StageId::Extracting
        } else if self.open_transition().is_some() {
            // Re-entering while an invocation is open is always a bug.
            false
        } else {
            stage == self.current
                || self.current.next() == Some(stage)
                || (self.current == StageId::Validating && stage == StageId::Generating)
        };
        if !legal {
            return Err(StateError::IllegalTransition {
                from: self.current.to_string(),
                to: stage.to_string(),
            });
        }

        let attempt = match stage {
            StageId::Generating | StageId::Validating => self.retry_count + 1,
            _ => 1,
        };
        self.current = stage;
        self.history.push(StageTransition {
            stage,
            attempt,
            started_at: Utc::now(),
            finished_at: None,
            outcome: None,
        });
        Ok(())
    }

    /// Close the open history entry with the given outcome.
    pub fn finish_stage(&mut self, outcome: TransitionOutcome) {
        if let Some(open) = self.history.iter_mut().rev().find(|t| t.outcome.is_none()) {
            open.finished_at = Some(Utc::now());
            open.outcome = Some(outcome);
        }
    }

    /// Consume one retry from the budget, returning the new count.
    pub fn record_retry(&mut self) -> Result<u32, StateError> {
        if !self.can_retry() {
            return Err(StateError::RetryBudgetExhausted {
                retries: self.retry_count,
                max_retries: self.max_retries,
            });
        }
        self.retry_count += 1;
        Ok(self.retry_count)
    }

    /// Move to a terminal status. Idempotent transitions out of a terminal
    /// status are rejected so a cancelled workflow stays cancelled.
    pub fn finish(&mut self, status: WorkflowStatus) -> Result<(), StateError> {
        if self.status.is_terminal() {
            return Err(StateError::AlreadyTerminal { status: self.status });
        }
        self.status = status;
        Ok(())
    }

    fn open_transition(&self) -> Option<&StageTransition> {
        self.history.iter().rev().find(|t| t.outcome.is_none())
    }
}
