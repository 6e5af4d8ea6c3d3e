//! Prompt construction for the LLM-backed stages.
//!
//! Each builder returns the system text, user payload and schema hint for
//! one stage. The exact wording is an implementation detail; the schema
//! hints are the contract the postprocessing parsers rely on.

use crate::routes::category_route;
use menuforge_model::{CodeArtifact, DesignSpec, ExtractedText, StructuredMenu, ValidationReport};

pub const STRUCTURER_SYSTEM: &str = "You analyze restaurant menu text and extract structured \
    information: the restaurant name, menu categories with their items (name, description, \
    price, dietary tags), and any restaurant details (address, phone, hours, about). Prices \
    must be plain numbers without currency symbols. Reply with JSON only.";

pub const STRUCTURER_SCHEMA: &str = r#"{
  "restaurant_name": "string",
  "categories": [
    {"name": "string", "items": [{"name": "string", "description": "string", "price": 0.0, "tags": ["string"]}]}
  ],
  "restaurant_info": {"address": "string|null", "phone": "string|null", "hours": "string|null", "about": "string|null"}
}"#;

pub const DESIGNER_SYSTEM: &str = "You are a designer creating a coherent token set for a \
    restaurant website: a palette of hex colors, typography, a layout style and a spacing \
    scale. Choose colors that work together. Reply with JSON only.";

pub const DESIGNER_SCHEMA: &str = r##"{
  "design_system": {"primary_color": "#rrggbb", "secondary_color": "#rrggbb", "accent_color": "#rrggbb", "background_color": "#rrggbb", "text_color": "#rrggbb"},
  "typography": {"heading_font": "string", "body_font": "string", "heading_size": "2.5rem", "body_size": "1rem"},
  "layout_style": "modern|minimalist|elegant|rustic|contemporary",
  "spacing": {"small": "0.5rem", "medium": "1rem", "large": "2rem"}
}"##;

pub const GENERATOR_SYSTEM: &str = "You generate a complete React single-page application for \
    a restaurant. Requirements: client-side routing with one route per menu category plus a \
    home route; a package.json; exactly one entry file (src/index.js); design tokens applied \
    as CSS variables; functional components. Reply with JSON only.";

pub const GENERATOR_SCHEMA: &str = r#"{
  "files": [{"path": "src/App.jsx", "content": "string"}],
  "entry_point": "src/index.js"
}"#;

pub fn structurer_user(text: &ExtractedText) -> String {
    format!(
        "Extract the structured menu from this text:\n\n{}",
        text.full_text()
    )
}

pub fn designer_user(menu: &StructuredMenu, brief: Option<&str>) -> String {
    let categories = menu.category_names().join(", ");
    match brief {
        Some(brief) => format!(
            "Restaurant: {}\nCategories: {categories}\nDesign brief: {brief}",
            menu.restaurant_name
        ),
        None => format!(
            "Restaurant: {}\nCategories: {categories}\nNo design brief was provided; choose a \
             sophisticated contemporary look.",
            menu.restaurant_name
        ),
    }
}

pub fn generator_user(
    menu: &StructuredMenu,
    design: &DesignSpec,
    prior: Option<&CodeArtifact>,
    report: Option<&ValidationReport>,
) -> String {
    let routes: Vec<String> = menu
        .categories
        .iter()
        .map(|c| category_route(&c.name))
        .collect();

    let mut user = format!(
        "Generate the site for this restaurant.\n\nMenu:\n{}\n\nDesign tokens:\n{}\n\nRequired category routes: {}\n",
        serde_json::to_string_pretty(menu).unwrap_or_default(),
        serde_json::to_string_pretty(design).unwrap_or_default(),
        routes.join(", "),
    );

    // On retry, carry the prior artifact and the findings forward so the
    // model revises rather than regenerating blind.
    if let Some(prior) = prior {
        user.push_str("\nThis is a revision. Previous files:\n");
        for (path, content) in &prior.files {
            user.push_str(&format!("--- {path} ---\n{content}\n"));
        }
    }
    if let Some(report) = report {
        user.push_str("\nFix every one of these issues in the revised output:\n");
        for issue in &report.issues {
            user.push_str(&format!("- [{}] {}\n", issue.location, issue.message));
        }
    }
    user
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuforge_model::{Issue, MenuCategory, RestaurantInfo};

    fn menu() -> StructuredMenu {
        StructuredMenu::new(
            "Trattoria",
            vec![
                MenuCategory {
                    name: "Mains".into(),
                    items: vec![],
                },
                MenuCategory {
                    name: "Desserts".into(),
                    items: vec![],
                },
            ],
            RestaurantInfo::default(),
        )
    }

    #[test]
    fn generator_user_names_required_routes() {
        let design: DesignSpec = crate::stages::test_support::design();
        let user = generator_user(&menu(), &design, None, None);
        assert!(user.contains("/mains, /desserts"));
        assert!(!user.contains("This is a revision"));
    }

    #[test]
    fn retry_prompt_carries_prior_files_and_issues() {
        let design: DesignSpec = crate::stages::test_support::design();
        let mut files = std::collections::BTreeMap::new();
        files.insert("src/index.js".to_string(), "render();".to_string());
        let prior = CodeArtifact::new(files, "src/index.js").unwrap();
        let report =
            ValidationReport::new(vec![Issue::blocking("src/App.jsx", "missing route for category 'Mains'")]);

        let user = generator_user(&menu(), &design, Some(&prior), Some(&report));
        assert!(user.contains("--- src/index.js ---"));
        assert!(user.contains("[src/App.jsx] missing route for category 'Mains'"));
    }
}
