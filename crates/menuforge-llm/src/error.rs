use thiserror::Error;

/// Failures from an LLM collaborator.
///
/// Provider response bodies are summarized, never forwarded verbatim, so
/// raw collaborator details do not leak into user-facing errors.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM backend misconfigured: {0}")]
    Misconfiguration(String),

    #[error("LLM transport failure: {0}")]
    Transport(String),

    #[error("LLM provider '{provider}' returned status {status}: {message}")]
    Provider {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("LLM response is not the expected JSON payload: {0}")]
    MalformedResponse(String),
}
