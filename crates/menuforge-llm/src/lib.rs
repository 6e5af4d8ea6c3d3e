//! LLM client abstraction for menuforge
//!
//! Stages that need a generation capability (structurer, designer,
//! generator) depend only on the [`LlmClient`] trait; the concrete backend
//! is selected from configuration. Every reply is treated as untrusted
//! text: callers strip fences with [`extract_json_payload`] and parse with
//! serde before anything crosses a stage boundary.

mod error;
mod openai;
mod parse;
mod scripted;
mod types;

pub use error::LlmError;
pub use openai::OpenAiClient;
pub use parse::extract_json_payload;
pub use scripted::ScriptedClient;
pub use types::{Completion, CompletionRequest, LlmClient};

use menuforge_config::LlmConfig;
use std::sync::Arc;

/// Construct the backend named by configuration.
///
/// `openai` builds the HTTP backend (API key read from the configured
/// environment variable); `scripted` builds an empty playback client for
/// dry runs.
///
/// # Errors
///
/// Returns [`LlmError::Misconfiguration`] for unknown providers or a
/// missing API key.
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiClient::new_from_config(config)?)),
        "scripted" => Ok(Arc::new(ScriptedClient::new())),
        unknown => Err(LlmError::Misconfiguration(format!(
            "unknown LLM provider '{unknown}'; supported providers: openai, scripted"
        ))),
    }
}
