use serde::{Deserialize, Serialize};

/// Color tokens for the generated site, as `#rrggbb` hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
}

/// Font family and size tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typography {
    pub heading_font: String,
    pub body_font: String,
    pub heading_size: String,
    pub body_size: String,
}

/// Spacing scale tokens as CSS lengths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spacing {
    pub small: String,
    pub medium: String,
    pub large: String,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            small: "0.5rem".into(),
            medium: "1rem".into(),
            large: "2rem".into(),
        }
    }
}

/// Coherent token set produced by the designer stage.
///
/// Produced exactly once per workflow; the designer stage is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignSpec {
    pub palette: Palette,
    pub typography: Typography,
    /// Overall layout direction, e.g. `modern`, `minimalist`, `rustic`.
    pub layout_style: String,
    #[serde(default)]
    pub spacing: Spacing,
}
