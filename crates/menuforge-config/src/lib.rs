//! Configuration for the menuforge pipeline
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `MENUFORGE_*` environment variable overrides. All values are
//! validated before a `Config` is handed out; invalid values fail loading
//! rather than being silently clamped, with the single exception of the
//! stage timeout floor.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file: {0}")]
    InvalidFile(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Retry and timeout policy for one workflow instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Upper bound on Generating↔Validating retries. Total generator
    /// invocations = `max_retries + 1`.
    pub max_retries: u32,
    /// Per-stage suspension deadline in seconds.
    pub stage_timeout_secs: u64,
}

impl WorkflowConfig {
    /// Default retry budget.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    /// Default per-stage timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
    /// Smallest accepted timeout; lower values are clamped up.
    pub const MIN_TIMEOUT_SECS: u64 = 1;

    /// Per-stage timeout as a [`Duration`], with the floor applied.
    #[must_use]
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs.max(Self::MIN_TIMEOUT_SECS))
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_retries: Self::DEFAULT_MAX_RETRIES,
            stage_timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// LLM collaborator selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend provider: `openai` (OpenAI-compatible HTTP API) or
    /// `scripted` (deterministic canned responses, used by `--dry-run`).
    pub provider: String,
    /// Model name passed to the backend.
    pub model: String,
    /// Environment variable holding the API key for HTTP providers.
    pub api_key_env: String,
    /// Override for the chat-completions endpoint URL.
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            base_url: None,
            max_tokens: 4096,
            temperature: 0.2,
        }
    }
}

/// Artifact persistence settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory for the filesystem store. `None` selects the
    /// in-memory store.
    pub root: Option<PathBuf>,
}

/// Effective menuforge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub workflow: WorkflowConfig,
    pub llm: LlmConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Parse a TOML document into a config, applying defaults for missing
    /// sections, then validate.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional file path, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or if any value
    /// (including an override) is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|source| ConfigError::Io {
                    path: p.to_path_buf(),
                    source,
                })?;
                debug!(path = %p.display(), "loaded configuration file");
                toml::from_str::<Self>(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MENUFORGE_*` environment overrides in place.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = env_var("MENUFORGE_MAX_RETRIES") {
            self.workflow.max_retries = parse_env("MENUFORGE_MAX_RETRIES", &v)?;
        }
        if let Some(v) = env_var("MENUFORGE_STAGE_TIMEOUT_SECS") {
            self.workflow.stage_timeout_secs = parse_env("MENUFORGE_STAGE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = env_var("MENUFORGE_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = env_var("MENUFORGE_PROVIDER") {
            self.llm.provider = v;
        }
        if let Some(v) = env_var("MENUFORGE_STORE_ROOT") {
            self.store.root = Some(PathBuf::from(v));
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "llm.model".into(),
                value: self.llm.model.clone(),
            });
        }
        match self.llm.provider.as_str() {
            "openai" | "scripted" => {}
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "llm.provider".into(),
                    value: other.to_string(),
                })
            }
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidValue {
                key: "llm.temperature".into(),
                value: self.llm.temperature.to_string(),
            });
        }
        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.workflow.max_retries, 3);
        assert_eq!(config.workflow.stage_timeout(), Duration::from_secs(60));
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config = Config::from_toml_str(
            r#"
            [workflow]
            max_retries = 1

            [llm]
            model = "gpt-4o"
            "#,
        )
        .unwrap();
        assert_eq!(config.workflow.max_retries, 1);
        assert_eq!(
            config.workflow.stage_timeout_secs,
            WorkflowConfig::DEFAULT_TIMEOUT_SECS
        );
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn timeout_floor_is_clamped_not_rejected() {
        let config = Config::from_toml_str("[workflow]\nstage_timeout_secs = 0\n").unwrap();
        assert_eq!(config.workflow.stage_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = Config::from_toml_str("[llm]\nprovider = \"psychic\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "llm.provider"));
    }

    #[test]
    fn empty_model_is_rejected() {
        let err = Config::from_toml_str("[llm]\nmodel = \" \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "llm.model"));
    }
}
