//! OpenAI-compatible HTTP backend
//!
//! Talks to any chat-completions endpoint speaking the OpenAI wire format.
//! The API key is read from an environment variable named in configuration;
//! keys never appear in logs or error messages.

use crate::error::LlmError;
use crate::types::{Completion, CompletionRequest, LlmClient};
use async_trait::async_trait;
use menuforge_config::LlmConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default chat-completions endpoint.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// HTTP client transport timeout. Generous on purpose: the per-stage
/// deadline is enforced by the orchestrator, this only guards a wedged
/// connection.
const TRANSPORT_TIMEOUT_SECS: u64 = 300;

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    default_model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Build a client from configuration, reading the API key from the
    /// configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Misconfiguration`] when the key variable is
    /// unset or the HTTP client cannot be constructed.
    pub fn new_from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            LlmError::Misconfiguration(format!(
                "API key not found in environment variable '{}'",
                config.api_key_env
            ))
        })?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(TRANSPORT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Misconfiguration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            default_model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn resolve_model(&self, request: &CompletionRequest) -> String {
        if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        }
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens: Option<u64>,
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        let model = self.resolve_model(&request);

        // Fold the schema hint into the system message; the generic wire
        // format has no dedicated schema slot.
        let system = match &request.schema_hint {
            Some(hint) => format!(
                "{}\n\nRespond with a single JSON object matching this shape:\n{hint}",
                request.system
            ),
            None => request.system.clone(),
        };

        debug!(
            provider = "openai",
            model = %model,
            max_tokens = request.max_tokens.min(self.max_tokens),
            "invoking chat completions endpoint"
        );

        let body = WireRequest {
            model: &model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &system,
                },
                WireMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: if request.temperature > 0.0 {
                request.temperature
            } else {
                self.temperature
            },
            max_tokens: request.max_tokens.min(self.max_tokens),
        };

        let response = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(sanitize_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            // Summarize rather than forwarding the body verbatim.
            return Err(LlmError::Provider {
                provider: "openai".into(),
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("request rejected")
                    .to_string(),
            });
        }

        let parsed: WireResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        let mut completion = Completion::new(content, parsed.model.unwrap_or(model));
        if let Some(usage) = parsed.usage {
            completion.tokens_input = usage.prompt_tokens;
            completion.tokens_output = usage.completion_tokens;
        }
        Ok(completion)
    }
}

/// Reduce a reqwest error to a connection-level summary. The full error
/// chain can embed request URLs, which may carry key material in query
/// strings for nonstandard endpoints.
fn sanitize_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        "request failed".to_string()
    }
}
