//! Helpers over shopping item records supplied by the host application.
//!
//! Records are only read, never mutated.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::category::{normalize_category, Category};
use crate::classifier::Classifier;
use crate::corrections::Corrections;
use crate::normalize::{collapse_whitespace, strip_accents};

/// Unit words dropped from duplicate-detection keys.
const UNIT_WORDS: &[&str] = &["kg", "g", "un", "und", "unidade", "unidades"];

/// A shopping list record as supplied by the item source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    #[serde(default, alias = "nome")]
    pub name: Option<String>,
    #[serde(default, alias = "categoria")]
    pub category: Option<String>,
    /// Unparseable timestamps read as `None` instead of rejecting the record.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// RFC 3339 text (a space separator is accepted) or epoch milliseconds.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(i64),
        Other(IgnoredAny),
    }

    let parsed = match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) => DateTime::parse_from_rfc3339(&text.trim().replacen(' ', "T", 1))
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Some(Raw::Millis(ms)) => DateTime::from_timestamp_millis(ms),
        Some(Raw::Other(_)) | None => None,
    };
    Ok(parsed)
}

impl ShoppingItem {
    pub fn new(name: &str, category: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()),
            category: category.map(str::to_string),
            created_at: None,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Items sharing a category, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: Category,
    pub items: Vec<&'a ShoppingItem>,
}

/// Effective category of an item.
///
/// A weighed-goods category stays `Weighted`, a genuine stored category wins,
/// and anything else is classified from the name (never as `Weighted`).
pub fn resolve_item_category(
    item: &ShoppingItem,
    classifier: &Classifier,
    corrections: &impl Corrections,
) -> Category {
    let stored = normalize_category(item.category.as_deref().unwrap_or(""));
    match stored {
        Category::Weighted => Category::Weighted,
        Category::General => match classifier.classify(item.name(), corrections) {
            Category::Weighted => Category::General,
            inferred => inferred,
        },
        category => category,
    }
}

/// Bucket unit-priced items by effective category in the fixed general order.
///
/// Weighed goods are left out and empty groups are dropped.
pub fn group_by_category<'a>(
    items: &'a [ShoppingItem],
    classifier: &Classifier,
    corrections: &impl Corrections,
) -> Vec<CategoryGroup<'a>> {
    let mut buckets: HashMap<Category, Vec<&'a ShoppingItem>> = HashMap::new();

    for item in items {
        let category = resolve_item_category(item, classifier, corrections);
        if category == Category::Weighted {
            continue;
        }
        buckets.entry(category).or_default().push(item);
    }

    Category::GENERAL_ORDER
        .iter()
        .filter_map(|&category| {
            buckets
                .remove(&category)
                .map(|items| CategoryGroup { category, items })
        })
        .collect()
}

/// Key for spotting the same product typed differently.
///
/// Drops parenthesized notes, unit words and accents:
/// "Arroz (kg)" and "arroz 5 KG" both map to "arroz" / "arroz 5".
pub fn name_key(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let without_notes = strip_parenthesized(&lower);
    let words: Vec<&str> = without_notes
        .split_whitespace()
        .filter(|w| !UNIT_WORDS.contains(w))
        .collect();
    collapse_whitespace(&strip_accents(&words.join(" ")))
}

/// Drop each `(...)` group. An unclosed `(` is kept as text.
fn strip_parenthesized(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')') else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

/// Most frequently added names, for quick re-entry.
///
/// Ranked by count, then by most recent `created_at`. Each suggestion uses
/// the most recently added spelling. `limit` is floored at 1.
pub fn recurring_suggestions(items: &[ShoppingItem], limit: usize) -> Vec<String> {
    struct Tally {
        name: String,
        count: usize,
        latest: i64,
    }

    let mut tallies: HashMap<String, Tally> = HashMap::new();
    for item in items {
        let raw = item.name().trim();
        let key = name_key(raw);
        if key.is_empty() {
            continue;
        }

        let created = item.created_at.map(|t| t.timestamp_millis()).unwrap_or(0);
        let tally = tallies.entry(key).or_insert_with(|| Tally {
            name: raw.to_string(),
            count: 0,
            latest: 0,
        });
        tally.count += 1;
        if created >= tally.latest {
            tally.latest = created;
            tally.name = raw.to_string();
        }
    }

    let mut ranked: Vec<Tally> = tallies.into_values().collect();
    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(b.latest.cmp(&a.latest))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked
        .into_iter()
        .take(limit.max(1))
        .map(|t| t.name)
        .collect()
}

/// Names that appear more than once, with the last spelling seen and a count.
///
/// Sorted by count (descending), then by label.
pub fn duplicates(items: &[ShoppingItem]) -> Vec<(String, usize)> {
    let mut rows: HashMap<String, (String, usize)> = HashMap::new();
    for item in items {
        let key = name_key(item.name());
        if key.is_empty() {
            continue;
        }
        let row = rows.entry(key).or_insert_with(|| (String::new(), 0));
        row.0 = item.name().to_string();
        row.1 += 1;
    }

    let mut dupes: Vec<(String, usize)> = rows.into_values().filter(|(_, n)| *n > 1).collect();
    dupes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    dupes
}
