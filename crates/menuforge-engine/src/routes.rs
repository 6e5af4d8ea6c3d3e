//! Category → route mapping shared by the generator and validator.

use menuforge_model::StructuredMenu;
use once_cell::sync::Lazy;
use regex::Regex;

/// Route path declarations in generated router code, e.g.
/// `<Route path="/mains" ...>`.
static ROUTE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"path=["']([^"']+)["']"#).expect("route regex"));

/// URL slug for a category name: lowercased, non-alphanumeric runs
/// collapsed to single hyphens.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// The client-side route expected for a category.
#[must_use]
pub fn category_route(name: &str) -> String {
    format!("/{}", slugify(name))
}

/// All route paths declared anywhere in a source file.
#[must_use]
pub fn declared_routes(source: &str) -> Vec<String> {
    ROUTE_PATH
        .captures_iter(source)
        .map(|c| c[1].to_string())
        .collect()
}

/// Routes every generated site declares regardless of menu content.
#[must_use]
pub fn standard_routes(menu: &StructuredMenu) -> Vec<String> {
    let mut routes = vec!["/".to_string()];
    routes.extend(menu.categories.iter().map(|c| category_route(&c.name)));
    routes
}
