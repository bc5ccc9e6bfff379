use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, strip_accents};

/// Grocery category an item can be filed under.
///
/// `Weighted` ("Churrasco") is the separate axis for goods priced by weight.
/// `General` ("Geral") is the explicit no-match fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Limpeza e Higiene")]
    CleaningHygiene,
    #[serde(rename = "Padaria e Laticínios")]
    BakeryDairy,
    #[serde(rename = "Hortifruti")]
    Produce,
    #[serde(rename = "Bebidas")]
    Beverages,
    #[serde(rename = "Mercearia")]
    Grocery,
    #[serde(rename = "Proteínas e Ovos")]
    ProteinEggs,
    #[serde(rename = "Geral")]
    General,
    #[serde(rename = "Churrasco")]
    Weighted,
}

/// Display icon and style class for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryMeta {
    pub icon: &'static str,
    pub class_name: &'static str,
}

impl Category {
    /// Every category in default grouping/display order.
    pub const ALL: &[Category] = &[
        Self::CleaningHygiene,
        Self::BakeryDairy,
        Self::Produce,
        Self::Beverages,
        Self::Grocery,
        Self::ProteinEggs,
        Self::General,
        Self::Weighted,
    ];

    /// Categories eligible for keyword scoring and corrections.
    pub const SCORED: &[Category] = &[
        Self::CleaningHygiene,
        Self::BakeryDairy,
        Self::Produce,
        Self::Beverages,
        Self::Grocery,
        Self::ProteinEggs,
    ];

    /// Grouping order for unit-priced items: the scored categories, then General.
    pub const GENERAL_ORDER: &[Category] = &[
        Self::CleaningHygiene,
        Self::BakeryDairy,
        Self::Produce,
        Self::Beverages,
        Self::Grocery,
        Self::ProteinEggs,
        Self::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CleaningHygiene => "Limpeza e Higiene",
            Self::BakeryDairy => "Padaria e Laticínios",
            Self::Produce => "Hortifruti",
            Self::Beverages => "Bebidas",
            Self::Grocery => "Mercearia",
            Self::ProteinEggs => "Proteínas e Ovos",
            Self::General => "Geral",
            Self::Weighted => "Churrasco",
        }
    }

    pub fn meta(&self) -> CategoryMeta {
        let (icon, class_name) = match self {
            Self::CleaningHygiene => ("🧽", "cat-clean"),
            Self::BakeryDairy => ("🥖", "cat-bakery"),
            Self::Produce => ("🥬", "cat-produce"),
            Self::Beverages => ("🥤", "cat-drinks"),
            Self::Grocery => ("🛒", "cat-grocery"),
            Self::ProteinEggs => ("🥚", "cat-protein"),
            Self::General => ("📦", "cat-general"),
            Self::Weighted => ("🔥", "cat-churrasco"),
        };
        CategoryMeta { icon, class_name }
    }

    /// Exact (case/accent-insensitive) match against the display names.
    pub fn from_name(raw: &str) -> Option<Category> {
        let normalized = normalize(raw);
        CANONICAL_NAMES
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|&(_, category)| category)
    }

    /// True for the six categories a correction may point to.
    pub fn is_scored(&self) -> bool {
        !matches!(self, Self::General | Self::Weighted)
    }

    /// Stable identifier for cross-referencing this category elsewhere.
    pub fn anchor_slug(&self) -> String {
        anchor_slug(self.as_str())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized display name → category, for exact parsing.
static CANONICAL_NAMES: LazyLock<Vec<(String, Category)>> = LazyLock::new(|| {
    Category::ALL
        .iter()
        .map(|&c| (normalize(c.as_str()), c))
        .collect()
});

/// Normalized prefix that marks the weighed-goods category.
const WEIGHTED_PREFIX: &str = "churrasco";

/// Designations external records use for by-weight items.
const WEIGHT_DESIGNATIONS: &[&str] = &["peso", "por peso", "kg", "a granel", "granel"];

/// Whether a raw category string designates weighed goods.
pub fn is_weighted_designation(raw: &str) -> bool {
    let normalized = normalize(raw);
    normalized.starts_with(WEIGHTED_PREFIX) || WEIGHT_DESIGNATIONS.contains(&normalized.as_str())
}

/// Parse an untrusted category string into a [`Category`].
///
/// Total: unknown or empty input degrades to `General`.
pub fn normalize_category(raw: &str) -> Category {
    if is_weighted_designation(raw) {
        return Category::Weighted;
    }

    let normalized = normalize(raw);
    if normalized.is_empty() {
        return Category::General;
    }

    if let Some(category) = Category::from_name(&normalized) {
        return category;
    }

    match normalized.as_str() {
        "limpeza" | "higiene" => Category::CleaningHygiene,
        "padaria" | "laticinios" => Category::BakeryDairy,
        "proteinas" | "ovos" => Category::ProteinEggs,
        _ => Category::General,
    }
}

/// Derive a URL-fragment style slug: "Padaria e Laticínios" → "padaria-e-laticinios".
///
/// Hyphens already in the input are kept as separators.
pub fn anchor_slug(raw: &str) -> String {
    let folded = strip_accents(&raw.to_lowercase());
    let cleaned: String = folded
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn canonical_names_parse() {
        for &c in Category::ALL {
            assert_eq!(normalize_category(c.as_str()), c);
        }
    }

    #[test]
    fn parse_is_case_and_accent_insensitive() {
        assert_eq!(normalize_category("padaria e laticinios"), Category::BakeryDairy);
        assert_eq!(normalize_category("PROTEINAS E OVOS"), Category::ProteinEggs);
        assert_eq!(normalize_category("  bebidas "), Category::Beverages);
    }

    #[test]
    fn from_name_is_exact() {
        assert_eq!(Category::from_name("mercearia"), Some(Category::Grocery));
        assert_eq!(Category::from_name("Limpeza"), None);
        assert_eq!(Category::from_name(""), None);
    }

    #[test]
    fn synonyms() {
        assert_eq!(normalize_category("Limpeza"), Category::CleaningHygiene);
        assert_eq!(normalize_category("Higiene"), Category::CleaningHygiene);
        assert_eq!(normalize_category("Padaria"), Category::BakeryDairy);
        assert_eq!(normalize_category("Laticínios"), Category::BakeryDairy);
        assert_eq!(normalize_category("Proteínas"), Category::ProteinEggs);
        assert_eq!(normalize_category("ovos"), Category::ProteinEggs);
    }

    #[test]
    fn weighted_designations() {
        assert_eq!(normalize_category("Churrasco"), Category::Weighted);
        assert_eq!(normalize_category("churrasco de domingo"), Category::Weighted);
        assert_eq!(normalize_category("PESO"), Category::Weighted);
        assert_eq!(normalize_category("kg"), Category::Weighted);
        assert!(!is_weighted_designation("Bebidas"));
    }

    #[test]
    fn unknown_is_general() {
        assert_eq!(normalize_category("qualquer coisa"), Category::General);
        assert_eq!(normalize_category(""), Category::General);
        assert_eq!(normalize_category("???"), Category::General);
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&Category::BakeryDairy).unwrap();
        assert_eq!(json, "\"Padaria e Laticínios\"");
        let back: Category = serde_json::from_str("\"Churrasco\"").unwrap();
        assert_eq!(back, Category::Weighted);
    }

    #[test]
    fn slugs() {
        assert_eq!(Category::CleaningHygiene.anchor_slug(), "limpeza-e-higiene");
        assert_eq!(Category::BakeryDairy.anchor_slug(), "padaria-e-laticinios");
        assert_eq!(Category::Weighted.anchor_slug(), "churrasco");
        assert_eq!(anchor_slug("  Frios -- e   Embutidos! "), "frios----e-embutidos");
        assert_eq!(anchor_slug(""), "");
    }

    #[test]
    fn slugs_are_stable_and_distinct() {
        let slugs: HashSet<String> = Category::ALL.iter().map(|c| c.anchor_slug()).collect();
        assert_eq!(slugs.len(), Category::ALL.len());
        for &c in Category::ALL {
            assert_eq!(c.anchor_slug(), c.anchor_slug());
        }
    }

    #[test]
    fn scored_excludes_fallbacks() {
        assert_eq!(Category::SCORED.len(), 6);
        assert!(Category::SCORED.iter().all(Category::is_scored));
        assert!(!Category::General.is_scored());
        assert!(!Category::Weighted.is_scored());
    }

    #[test]
    fn meta_lookup() {
        assert_eq!(Category::Produce.meta().class_name, "cat-produce");
        assert_eq!(Category::General.meta().icon, "📦");
    }
}
