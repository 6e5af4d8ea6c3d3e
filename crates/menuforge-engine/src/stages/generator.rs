use crate::error::GenerationError;
use crate::prompts;
use crate::stage::Stage;
use async_trait::async_trait;
use menuforge_llm::{extract_json_payload, CompletionRequest, LlmClient};
use menuforge_model::{CodeArtifact, DesignSpec, StageId, StructuredMenu, ValidationReport};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Component, Path};
use std::sync::Arc;
use tracing::info;

const GENERATOR_TEMPERATURE: f32 = 0.2;

/// Fourth stage: emit the site as a file tree.
///
/// Runs in two modes with the same contract: fresh generation, and
/// revision, where the prior artifact and the validation findings are
/// folded into the prompt so the model corrects rather than starts over.
pub struct Generator {
    llm: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
}

pub struct GeneratorInput {
    pub menu: StructuredMenu,
    pub design: DesignSpec,
    pub prior: Option<CodeArtifact>,
    pub report: Option<ValidationReport>,
}

#[derive(Deserialize)]
struct RawArtifact {
    files: Vec<RawFile>,
    entry_point: String,
}

#[derive(Deserialize)]
struct RawFile {
    path: String,
    content: String,
}

impl Generator {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            llm,
            model: model.into(),
            max_tokens,
        }
    }

    fn coerce(raw: RawArtifact) -> Result<CodeArtifact, GenerationError> {
        let mut files = BTreeMap::new();
        for file in raw.files {
            if !is_safe_path(&file.path) {
                return Err(GenerationError::UnsafePath { path: file.path });
            }
            files.insert(file.path, file.content);
        }
        Ok(CodeArtifact::new(files, raw.entry_point)?)
    }
}

/// A generated path must stay inside the artifact root once rendered to
/// disk: relative, and free of parent traversals.
fn is_safe_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[async_trait]
impl Stage for Generator {
    type Input = GeneratorInput;
    type Output = CodeArtifact;
    type Error = GenerationError;

    fn id(&self) -> StageId {
        StageId::Generating
    }

    async fn run(&self, input: GeneratorInput) -> Result<CodeArtifact, GenerationError> {
        let revision = input.prior.is_some();
        let request = CompletionRequest {
            system: prompts::GENERATOR_SYSTEM.to_string(),
            user: prompts::generator_user(
                &input.menu,
                &input.design,
                input.prior.as_ref(),
                input.report.as_ref(),
            ),
            schema_hint: Some(prompts::GENERATOR_SCHEMA.to_string()),
            model: self.model.clone(),
            temperature: GENERATOR_TEMPERATURE,
            max_tokens: self.max_tokens,
        };
        let completion = self.llm.complete(request).await?;

        let payload = extract_json_payload(&completion.content);
        let raw: RawArtifact = serde_json::from_str(payload)
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        let artifact = Self::coerce(raw)?;
        info!(
            files = artifact.file_count(),
            entry = %artifact.entry_point,
            revision,
            "generated site artifact"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_support;
    use menuforge_llm::ScriptedClient;
    use menuforge_model::{ArtifactError, RestaurantInfo};

    fn menu() -> StructuredMenu {
        StructuredMenu::new("Trattoria", vec![], RestaurantInfo::default())
    }

    fn run_with(reply: &str) -> Result<CodeArtifact, GenerationError> {
        let client = Arc::new(ScriptedClient::new());
        client.push_reply(reply);
        let stage = Generator::new(client, "test-model", 4096);
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(stage.run(GeneratorInput {
                menu: menu(),
                design: test_support::design(),
                prior: None,
                report: None,
            }))
    }

    #[test]
    fn builds_an_artifact_from_a_file_list() {
        let artifact = run_with(
            r#"{"files": [
              {"path": "src/index.js", "content": "import './App';"},
              {"path": "src/App.jsx", "content": "export default () => null;"}
            ], "entry_point": "src/index.js"}"#,
        )
        .unwrap();
        assert_eq!(artifact.file_count(), 2);
        assert_eq!(artifact.entry_point, "src/index.js");
    }

    #[test]
    fn traversal_paths_are_rejected() {
        let err = run_with(
            r#"{"files": [{"path": "../outside.js", "content": ""}], "entry_point": "../outside.js"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::UnsafePath { path } if path == "../outside.js"));
    }

    #[test]
    fn absolute_paths_are_rejected() {
        let err = run_with(
            r#"{"files": [{"path": "/etc/passwd", "content": ""}], "entry_point": "/etc/passwd"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::UnsafePath { .. }));
    }

    #[test]
    fn entry_point_must_be_among_the_files() {
        let err = run_with(
            r#"{"files": [{"path": "src/App.jsx", "content": "x"}], "entry_point": "src/index.js"}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidArtifact(ArtifactError::MissingEntry { .. })
        ));
    }

    #[test]
    fn prose_reply_is_malformed() {
        let err = run_with("Here is your site!").unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }
}
