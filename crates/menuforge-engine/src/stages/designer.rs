use crate::error::DesignerError;
use crate::prompts;
use crate::stage::Stage;
use async_trait::async_trait;
use menuforge_llm::{extract_json_payload, CompletionRequest, LlmClient};
use menuforge_model::{DesignSpec, Palette, Spacing, StageId, StructuredMenu, Typography};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Higher temperature than the parsing stages: design benefits from
/// variety.
const DESIGNER_TEMPERATURE: f32 = 0.3;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("hex color regex"));

/// Third stage: select a coherent token set.
///
/// There is no correction loop for design: any failure here is fatal to
/// the workflow and the stage is never retried.
pub struct Designer {
    llm: Arc<dyn LlmClient>,
    model: String,
}

pub struct DesignerInput {
    pub menu: StructuredMenu,
    pub brief: Option<String>,
}

/// Wire shape of the designer reply, matching the schema hint.
#[derive(Deserialize)]
struct RawDesign {
    design_system: RawPalette,
    typography: RawTypography,
    #[serde(default)]
    layout_style: Option<String>,
    #[serde(default)]
    spacing: Option<RawSpacing>,
}

#[derive(Deserialize)]
struct RawPalette {
    primary_color: String,
    secondary_color: String,
    accent_color: String,
    background_color: String,
    text_color: String,
}

#[derive(Deserialize)]
struct RawTypography {
    heading_font: String,
    body_font: String,
    #[serde(default)]
    heading_size: Option<String>,
    #[serde(default)]
    body_size: Option<String>,
}

#[derive(Deserialize)]
struct RawSpacing {
    small: String,
    medium: String,
    large: String,
}

impl Designer {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    fn coerce(raw: RawDesign) -> Result<DesignSpec, DesignerError> {
        let palette = Palette {
            primary: checked_color("primary_color", raw.design_system.primary_color)?,
            secondary: checked_color("secondary_color", raw.design_system.secondary_color)?,
            accent: checked_color("accent_color", raw.design_system.accent_color)?,
            background: checked_color("background_color", raw.design_system.background_color)?,
            text: checked_color("text_color", raw.design_system.text_color)?,
        };
        Ok(DesignSpec {
            palette,
            typography: Typography {
                heading_font: raw.typography.heading_font,
                body_font: raw.typography.body_font,
                heading_size: raw.typography.heading_size.unwrap_or_else(|| "2.5rem".into()),
                body_size: raw.typography.body_size.unwrap_or_else(|| "1rem".into()),
            },
            layout_style: raw.layout_style.unwrap_or_else(|| "modern".into()),
            spacing: raw.spacing.map_or_else(Spacing::default, |s| Spacing {
                small: s.small,
                medium: s.medium,
                large: s.large,
            }),
        })
    }
}

fn checked_color(token: &str, value: String) -> Result<String, DesignerError> {
    let value = value.trim().to_string();
    if HEX_COLOR.is_match(&value) {
        Ok(value)
    } else {
        Err(DesignerError::InvalidColor {
            token: token.to_string(),
            value,
        })
    }
}

#[async_trait]
impl Stage for Designer {
    type Input = DesignerInput;
    type Output = DesignSpec;
    type Error = DesignerError;

    fn id(&self) -> StageId {
        StageId::Designing
    }

    async fn run(&self, input: DesignerInput) -> Result<DesignSpec, DesignerError> {
        let request = CompletionRequest {
            system: prompts::DESIGNER_SYSTEM.to_string(),
            user: prompts::designer_user(&input.menu, input.brief.as_deref()),
            schema_hint: Some(prompts::DESIGNER_SCHEMA.to_string()),
            model: self.model.clone(),
            temperature: DESIGNER_TEMPERATURE,
            max_tokens: 1024,
        };
        let completion = self.llm.complete(request).await?;

        let payload = extract_json_payload(&completion.content);
        let raw: RawDesign =
            serde_json::from_str(payload).map_err(|e| DesignerError::Malformed(e.to_string()))?;

        let design = Self::coerce(raw)?;
        info!(layout = %design.layout_style, "selected design tokens");
        Ok(design)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuforge_llm::ScriptedClient;
    use menuforge_model::RestaurantInfo;

    fn menu() -> StructuredMenu {
        StructuredMenu::new("Trattoria", vec![], RestaurantInfo::default())
    }

    fn run_with(reply: &str) -> Result<DesignSpec, DesignerError> {
        let client = Arc::new(ScriptedClient::new());
        client.push_reply(reply);
        let stage = Designer::new(client, "test-model");
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(stage.run(DesignerInput {
                menu: menu(),
                brief: None,
            }))
    }

    const GOOD: &str = r##"{
      "design_system": {"primary_color": "#8b0000", "secondary_color": "#f5e6c8",
        "accent_color": "#c9a227", "background_color": "#fffaf0", "text_color": "#2b2b2b"},
      "typography": {"heading_font": "Playfair Display", "body_font": "Source Sans Pro"},
      "layout_style": "elegant",
      "spacing": {"small": "0.5rem", "medium": "1rem", "large": "2rem"}
    }"##;

    #[test]
    fn accepts_a_complete_token_set() {
        let design = run_with(GOOD).unwrap();
        assert_eq!(design.palette.primary, "#8b0000");
        assert_eq!(design.layout_style, "elegant");
        assert_eq!(design.typography.heading_size, "2.5rem");
    }

    #[test]
    fn non_hex_color_is_fatal() {
        let reply = GOOD.replace("#8b0000", "dark red");
        let err = run_with(&reply).unwrap_err();
        assert!(
            matches!(err, DesignerError::InvalidColor { token, value } if token == "primary_color" && value == "dark red")
        );
    }

    #[test]
    fn missing_palette_is_malformed() {
        let err = run_with(r#"{"typography": {"heading_font": "A", "body_font": "B"}}"#).unwrap_err();
        assert!(matches!(err, DesignerError::Malformed(_)));
    }
}
