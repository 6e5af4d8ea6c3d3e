use crate::error::StructuringError;
use crate::prompts;
use crate::stage::Stage;
use async_trait::async_trait;
use menuforge_llm::{extract_json_payload, CompletionRequest, LlmClient};
use menuforge_model::{
    ExtractedText, MenuCategory, MenuItem, RestaurantInfo, StageId, StructuredMenu,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Low temperature: structuring is extraction, not invention.
const STRUCTURER_TEMPERATURE: f32 = 0.1;

/// Second stage: segment free text into categories and items.
///
/// The LLM reply is untrusted input: it is fence-stripped, parsed into
/// wire types, and only crosses the stage boundary after price
/// normalization and the duplicate-category merge.
pub struct Structurer {
    llm: Arc<dyn LlmClient>,
    model: String,
}

/// Wire shape of the structurer reply. Prices arrive as numbers or
/// strings ("$12.50", "12,50"); both are normalized.
#[derive(Deserialize)]
struct RawMenu {
    #[serde(default)]
    restaurant_name: Option<String>,
    #[serde(default)]
    categories: Vec<RawCategory>,
    #[serde(default)]
    restaurant_info: Option<RestaurantInfo>,
}

#[derive(Deserialize)]
struct RawCategory {
    name: String,
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Deserialize)]
struct RawItem {
    name: String,
    #[serde(default)]
    description: Option<String>,
    price: serde_json::Value,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

impl Structurer {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    fn coerce(raw: RawMenu) -> Result<StructuredMenu, StructuringError> {
        if raw.categories.is_empty() {
            return Err(StructuringError::EmptyMenu);
        }

        let mut categories = Vec::with_capacity(raw.categories.len());
        for category in raw.categories {
            let mut items = Vec::with_capacity(category.items.len());
            for item in category.items {
                let price = normalize_price(&item.price).ok_or_else(|| {
                    StructuringError::InvalidPrice {
                        item: item.name.clone(),
                        raw: item.price.to_string(),
                    }
                })?;
                items.push(MenuItem {
                    name: item.name,
                    description: item.description.unwrap_or_default(),
                    price,
                    tags: item.tags.unwrap_or_default(),
                });
            }
            categories.push(MenuCategory {
                name: category.name,
                items,
            });
        }

        Ok(StructuredMenu::new(
            raw.restaurant_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Restaurant".to_string()),
            categories,
            raw.restaurant_info.unwrap_or_default(),
        ))
    }
}

/// Normalize a wire price to a currency-agnostic non-negative number.
///
/// Accepts JSON numbers and strings with currency symbols and either
/// decimal separator: `12.5`, `"$12.50"`, `"12,50 €"`, `"1,234.56"`.
fn normalize_price(value: &serde_json::Value) -> Option<f64> {
    let price = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => parse_price_str(s)?,
        _ => return None,
    };
    (price.is_finite() && price >= 0.0).then_some(price)
}

fn parse_price_str(raw: &str) -> Option<f64> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if kept.is_empty() {
        return None;
    }
    let normalized = match (kept.rfind('.'), kept.rfind(',')) {
        // Both separators: the rightmost is the decimal point, the other
        // is a thousands separator.
        (Some(dot), Some(comma)) if dot > comma => kept.replace(',', ""),
        (Some(_), Some(_)) => kept.replace('.', "").replace(',', "."),
        // Comma only: treat as a decimal point ("12,50").
        (None, Some(_)) => kept.replace(',', "."),
        _ => kept,
    };
    normalized.parse().ok()
}

#[async_trait]
impl Stage for Structurer {
    type Input = ExtractedText;
    type Output = StructuredMenu;
    type Error = StructuringError;

    fn id(&self) -> StageId {
        StageId::Structuring
    }

    async fn run(&self, text: ExtractedText) -> Result<StructuredMenu, StructuringError> {
        let request = CompletionRequest {
            system: prompts::STRUCTURER_SYSTEM.to_string(),
            user: prompts::structurer_user(&text),
            schema_hint: Some(prompts::STRUCTURER_SCHEMA.to_string()),
            model: self.model.clone(),
            temperature: STRUCTURER_TEMPERATURE,
            max_tokens: 4096,
        };
        let completion = self.llm.complete(request).await?;

        let payload = extract_json_payload(&completion.content);
        let raw: RawMenu = serde_json::from_str(payload)
            .map_err(|e| StructuringError::Malformed(e.to_string()))?;

        let menu = Self::coerce(raw)?;
        info!(
            restaurant = %menu.restaurant_name,
            categories = menu.categories.len(),
            items = menu.item_count(),
            "structured menu"
        );
        Ok(menu)
    }
}
