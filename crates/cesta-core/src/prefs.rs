//! UI-scoped preferences persisted next to the corrections.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::CestaError;
use crate::storage::{load_json_or_default, save_json, KeyValueStore};

pub const UI_PREFS_KEY: &str = "shoppingUiPrefs";
pub const BUDGET_STORE_KEY: &str = "shoppingBudgetsByPeriod";

const STATUS_FILTERS: &[&str] = &["ALL", "PENDENTE", "COMPRADO"];
const SORT_KEYS: &[&str] = &["name_asc", "value_desc", "value_asc", "created_desc"];

/// List filters and sort order, as last left by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPrefs {
    pub filter_status: String,
    pub filter_collaborator: String,
    pub search_text: String,
    pub sort_key: String,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            filter_status: "ALL".into(),
            filter_collaborator: String::new(),
            search_text: String::new(),
            sort_key: "name_asc".into(),
        }
    }
}

impl UiPrefs {
    /// Load stored preferences, replacing unknown values with defaults.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let prefs: UiPrefs = load_json_or_default(store, UI_PREFS_KEY);
        prefs.sanitized()
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), CestaError> {
        save_json(store, UI_PREFS_KEY, &self.clone().sanitized())
    }

    fn sanitized(mut self) -> Self {
        if !STATUS_FILTERS.contains(&self.filter_status.as_str()) {
            self.filter_status = "ALL".into();
        }
        if !SORT_KEYS.contains(&self.sort_key.as_str()) {
            self.sort_key = "name_asc".into();
        }
        self
    }
}

/// Per-period spending budgets, keyed by period id then category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetStore {
    periods: BTreeMap<String, BTreeMap<Category, f64>>,
}

impl BudgetStore {
    /// Load stored budgets. Unknown categories and non-positive or
    /// non-numeric amounts are dropped.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let raw: HashMap<String, HashMap<String, serde_json::Value>> =
            load_json_or_default(store, BUDGET_STORE_KEY);

        let periods = raw
            .into_iter()
            .map(|(period, budgets)| {
                let budgets = budgets
                    .into_iter()
                    .filter_map(|(category, amount)| {
                        let category = Category::from_name(&category)?;
                        let amount = amount.as_f64().filter(|a| *a > 0.0)?;
                        Some((category, amount))
                    })
                    .collect();
                (period, budgets)
            })
            .collect();

        Self { periods }
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), CestaError> {
        let out: BTreeMap<&str, BTreeMap<&str, f64>> = self
            .periods
            .iter()
            .map(|(period, budgets)| {
                let budgets = budgets.iter().map(|(c, a)| (c.as_str(), *a)).collect();
                (period.as_str(), budgets)
            })
            .collect();
        save_json(store, BUDGET_STORE_KEY, &out)
    }

    /// Budgets for one period (empty if none were set).
    pub fn for_period(&self, period: &str) -> BTreeMap<Category, f64> {
        self.periods.get(period).cloned().unwrap_or_default()
    }

    /// Set or clear (amount ≤ 0) one category budget.
    pub fn set(&mut self, period: &str, category: Category, amount: f64) {
        let budgets = self.periods.entry(period.to_string()).or_default();
        if amount > 0.0 && amount.is_finite() {
            budgets.insert(category, amount);
        } else {
            budgets.remove(&category);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn prefs_default_when_missing() {
        let store = MemoryStore::new();
        assert_eq!(UiPrefs::load(&store), UiPrefs::default());
    }

    #[test]
    fn prefs_roundtrip() {
        let mut store = MemoryStore::new();
        let prefs = UiPrefs {
            filter_status: "COMPRADO".into(),
            filter_collaborator: "Ana".into(),
            search_text: "leite".into(),
            sort_key: "value_desc".into(),
        };
        prefs.save(&mut store).unwrap();
        assert_eq!(UiPrefs::load(&store), prefs);

        let raw = store.get(UI_PREFS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"filterStatus\":\"COMPRADO\""));
    }

    #[test]
    fn prefs_sanitize_unknown_values() {
        let mut store = MemoryStore::new();
        store
            .set(UI_PREFS_KEY, r#"{"filterStatus":"WHATEVER","sortKey":"random","searchText":"pao"}"#)
            .unwrap();
        let prefs = UiPrefs::load(&store);
        assert_eq!(prefs.filter_status, "ALL");
        assert_eq!(prefs.sort_key, "name_asc");
        assert_eq!(prefs.search_text, "pao");
    }

    #[test]
    fn prefs_malformed_json() {
        let mut store = MemoryStore::new();
        store.set(UI_PREFS_KEY, "[").unwrap();
        assert_eq!(UiPrefs::load(&store), UiPrefs::default());
    }

    #[test]
    fn budgets_roundtrip() {
        let mut store = MemoryStore::new();
        let mut budgets = BudgetStore::default();
        budgets.set("2026-03", Category::Grocery, 350.0);
        budgets.set("2026-03", Category::Weighted, 120.5);
        budgets.set("2026-04", Category::Beverages, 80.0);
        budgets.save(&mut store).unwrap();

        let loaded = BudgetStore::load(&store);
        assert_eq!(loaded, budgets);
        assert_eq!(loaded.for_period("2026-03").get(&Category::Weighted), Some(&120.5));
        assert!(loaded.for_period("1999-01").is_empty());
    }

    #[test]
    fn budgets_clear_with_zero() {
        let mut budgets = BudgetStore::default();
        budgets.set("p", Category::Grocery, 10.0);
        budgets.set("p", Category::Grocery, 0.0);
        assert!(budgets.for_period("p").is_empty());
    }

    #[test]
    fn budgets_drop_invalid_entries() {
        let mut store = MemoryStore::new();
        store
            .set(
                BUDGET_STORE_KEY,
                r#"{"p1":{"Mercearia":200,"Inventada":50,"Bebidas":"muito","Hortifruti":-3}}"#,
            )
            .unwrap();
        let loaded = BudgetStore::load(&store);
        let p1 = loaded.for_period("p1");
        assert_eq!(p1.len(), 1);
        assert_eq!(p1.get(&Category::Grocery), Some(&200.0));
    }
}
