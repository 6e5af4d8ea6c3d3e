use crate::error::LlmError;
use async_trait::async_trait;

/// Input to one LLM completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instructions framing the task.
    pub system: String,
    /// User payload: the text or JSON context the model operates on.
    pub user: String,
    /// Optional JSON shape the reply must conform to; appended to the
    /// system instructions by backends that have no native schema support.
    pub schema_hint: Option<String>,
    /// Model name; empty selects the backend default.
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            schema_hint: None,
            model: String::new(),
            temperature: 0.2,
            max_tokens: 4096,
        }
    }

    #[must_use]
    pub fn with_schema_hint(mut self, hint: impl Into<String>) -> Self {
        self.schema_hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Output of one LLM completion call.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Raw reply text, fences and all. Callers strip and parse it.
    pub content: String,
    /// Model the provider actually served.
    pub model_used: String,
    pub tokens_input: Option<u64>,
    pub tokens_output: Option<u64>,
}

impl Completion {
    #[must_use]
    pub fn new(content: impl Into<String>, model_used: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model_used: model_used.into(),
            tokens_input: None,
            tokens_output: None,
        }
    }
}

/// Generation capability consumed by the structurer, designer and
/// generator stages.
///
/// Implementations must be safe under concurrent use: multiple workflow
/// instances share one client.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Request one completion.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] for transport failures, provider errors and
    /// empty replies. Deadlines are enforced by the orchestrator, not here.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError>;
}
