use serde::{Deserialize, Serialize};

/// Ordered page-wise text blocks produced by the extractor stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub blocks: Vec<TextBlock>,
}

/// One block of extracted text, tagged with its source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// 1-based page number.
    pub page: u32,
    pub text: String,
}

impl ExtractedText {
    #[must_use]
    pub fn new(blocks: Vec<TextBlock>) -> Self {
        Self { blocks }
    }

    /// Concatenate all blocks in page order, one block per line group.
    #[must_use]
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&block.text);
        }
        out
    }

    /// True when no block carries any non-whitespace text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.text.trim().is_empty())
    }
}

/// A menu item with a normalized, currency-agnostic price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Normalized numeric price; currency symbols are stripped during
    /// structuring.
    pub price: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// An ordered group of items under one category heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuCategory {
    pub name: String,
    pub items: Vec<MenuItem>,
}

/// Supplementary restaurant details extracted alongside the menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantInfo {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
}

/// A fully structured menu: ordered categories with unique names.
///
/// The uniqueness invariant is enforced at construction: duplicate
/// category names are merged deterministically, with the first occurrence
/// keeping its position and later duplicates appending their items in
/// encounter order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredMenu {
    pub restaurant_name: String,
    pub categories: Vec<MenuCategory>,
    #[serde(default)]
    pub info: RestaurantInfo,
}

impl StructuredMenu {
    #[must_use]
    pub fn new(
        restaurant_name: impl Into<String>,
        categories: Vec<MenuCategory>,
        info: RestaurantInfo,
    ) -> Self {
        Self {
            restaurant_name: restaurant_name.into(),
            categories: merge_duplicate_categories(categories),
            info,
        }
    }

    #[must_use]
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

/// Merge categories sharing a name (case-insensitive after trimming).
///
/// First occurrence wins position and casing; items from later duplicates
/// are appended in order. The result carries no duplicate names.
fn merge_duplicate_categories(categories: Vec<MenuCategory>) -> Vec<MenuCategory> {
    let mut merged: Vec<MenuCategory> = Vec::with_capacity(categories.len());
    for mut category in categories {
        category.name = category.name.trim().to_string();
        let key = category.name.to_lowercase();
        match merged.iter_mut().find(|c| c.name.to_lowercase() == key) {
            Some(existing) => existing.items.append(&mut category.items),
            None => merged.push(category),
        }
    }
    merged
}
