//! Learned category corrections layered above the keyword scorer.
//!
//! Two tiers: a durable local map persisted through a [`KeyValueStore`], and a
//! shared snapshot replaced wholesale once per session. Shared entries take
//! precedence when both tiers know a name.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::{normalize_category, Category};
use crate::error::CestaError;
use crate::normalize::normalize;
use crate::storage::{load_json_or_default, save_json, KeyValueStore};

/// Storage key for the local corrections JSON object.
pub const LOCAL_CORRECTIONS_KEY: &str = "shoppingCategoryCorrections";

/// Read access to learned corrections, as seen by the classifier.
pub trait Corrections {
    /// Category override for an already-normalized name, if any.
    fn lookup(&self, normalized_name: &str) -> Option<Category>;
}

/// A correction layer that never overrides anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCorrections;

impl Corrections for NoCorrections {
    fn lookup(&self, _normalized_name: &str) -> Option<Category> {
        None
    }
}

/// A user-confirmed (name → category) override, as shared with other devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionEntry {
    pub normalized_name: String,
    #[serde(rename = "categoria")]
    pub category: Category,
    pub sample_name: String,
    #[serde(rename = "updated_by_nome")]
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

impl CorrectionEntry {
    /// Build an entry from raw user input, stamped with the current time.
    ///
    /// Returns `None` when the name normalizes to nothing or the category is
    /// `General` or `Weighted`.
    pub fn new(raw_name: &str, raw_category: &str, updated_by: &str) -> Option<Self> {
        let (normalized_name, category) = validate(raw_name, raw_category)?;
        let sample = raw_name.trim();
        let updated_by = updated_by.trim();
        Some(Self {
            sample_name: if sample.is_empty() {
                normalized_name.clone()
            } else {
                sample.to_string()
            },
            normalized_name,
            category,
            updated_by: if updated_by.is_empty() {
                "Colaborador".to_string()
            } else {
                updated_by.to_string()
            },
            updated_at: Utc::now(),
        })
    }
}

/// Normalize a (name, category) pair and check it may be stored as a correction.
pub fn validate(raw_name: &str, raw_category: &str) -> Option<(String, Category)> {
    let name = normalize(raw_name);
    if name.is_empty() {
        return None;
    }
    let category = normalize_category(raw_category);
    category.is_scored().then_some((name, category))
}

/// Two-tier correction cache.
pub struct CorrectionStore<S> {
    storage: S,
    local: HashMap<String, Category>,
    shared: HashMap<String, Category>,
}

impl<S: KeyValueStore> CorrectionStore<S> {
    /// Build the store, reading local corrections from `storage`.
    ///
    /// Unreadable or malformed stored data yields an empty local map.
    pub fn load(storage: S) -> Self {
        let raw: HashMap<String, String> = load_json_or_default(&storage, LOCAL_CORRECTIONS_KEY);
        let local: HashMap<String, Category> = raw
            .iter()
            .filter_map(|(name, category)| validate(name, category))
            .collect();

        if local.len() != raw.len() {
            tracing::debug!(
                dropped = raw.len() - local.len(),
                "Skipped invalid stored corrections"
            );
        }

        Self {
            storage,
            local,
            shared: HashMap::new(),
        }
    }

    /// Shared tier first, then local. Only scored categories are honored.
    pub fn lookup(&self, normalized_name: &str) -> Option<Category> {
        let key = normalize(normalized_name);
        if key.is_empty() {
            return None;
        }

        self.shared
            .get(&key)
            .filter(|c| c.is_scored())
            .or_else(|| self.local.get(&key).filter(|c| c.is_scored()))
            .copied()
    }

    /// Record a user-confirmed correction locally and persist it.
    ///
    /// Returns `false` without writing when the name is empty or the category
    /// resolves to `General` or `Weighted`. A failed persist keeps the
    /// correction for this session and is only logged.
    pub fn record_local(&mut self, raw_name: &str, raw_category: &str) -> bool {
        let Some((name, category)) = validate(raw_name, raw_category) else {
            tracing::debug!(name = raw_name, category = raw_category, "Rejected correction");
            return false;
        };

        tracing::debug!(name = %name, category = %category, "Recorded local correction");
        self.local.insert(name, category);

        if let Err(e) = self.persist_local() {
            tracing::warn!(error = %e, "Failed to persist local corrections");
        }
        true
    }

    /// Replace the shared snapshot wholesale.
    ///
    /// Rows are expected newest first; the first row seen for a name wins.
    /// Rows with empty names or unscored categories are dropped.
    pub fn replace_shared<I, K, V>(&mut self, snapshot: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut shared = HashMap::new();
        for (name, category) in snapshot {
            if let Some((name, category)) = validate(name.as_ref(), category.as_ref()) {
                shared.entry(name).or_insert(category);
            }
        }

        tracing::info!(entries = shared.len(), "Replaced shared corrections");
        self.shared = shared;
    }

    /// Forget every local correction, in memory and in storage.
    pub fn clear_local(&mut self) -> Result<(), CestaError> {
        self.local.clear();
        self.storage.remove(LOCAL_CORRECTIONS_KEY)
    }

    /// Local corrections, sorted by name.
    pub fn local_entries(&self) -> BTreeMap<&str, Category> {
        self.local.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }

    pub fn local_len(&self) -> usize {
        self.local.len()
    }

    pub fn shared_len(&self) -> usize {
        self.shared.len()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist_local(&mut self) -> Result<(), CestaError> {
        let entries: BTreeMap<&str, &str> = self
            .local
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        save_json(&mut self.storage, LOCAL_CORRECTIONS_KEY, &entries)
    }
}

impl<S: KeyValueStore> Corrections for CorrectionStore<S> {
    fn lookup(&self, normalized_name: &str) -> Option<Category> {
        CorrectionStore::lookup(self, normalized_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn empty_store() -> CorrectionStore<MemoryStore> {
        CorrectionStore::load(MemoryStore::new())
    }

    // ── Local tier ────────────────────────────────────────────────────

    #[test]
    fn record_then_lookup() {
        let mut store = empty_store();
        assert!(store.record_local("Detergente X", "Bebidas"));
        assert_eq!(
            store.lookup(&normalize("Detergente X")),
            Some(Category::Beverages)
        );
    }

    #[test]
    fn rejects_fallback_categories() {
        let mut store = empty_store();
        assert!(!store.record_local("x", "Geral"));
        assert!(!store.record_local("picanha", "Churrasco"));
        assert!(!store.record_local("   ", "Bebidas"));
        assert!(!store.record_local("algo", "categoria inventada"));
        assert_eq!(store.local_len(), 0);
        assert_eq!(store.storage().get(LOCAL_CORRECTIONS_KEY).unwrap(), None);
    }

    #[test]
    fn record_upserts() {
        let mut store = empty_store();
        assert!(store.record_local("Sabão em pó", "Mercearia"));
        assert!(store.record_local("sabao em po", "Limpeza"));
        assert_eq!(store.local_len(), 1);
        assert_eq!(store.lookup("sabao em po"), Some(Category::CleaningHygiene));
    }

    #[test]
    fn local_corrections_survive_reload() {
        let mut store = empty_store();
        store.record_local("Água de coco", "Bebidas");
        let storage = store.storage().clone();

        let reloaded = CorrectionStore::load(storage);
        assert_eq!(reloaded.lookup("agua de coco"), Some(Category::Beverages));
    }

    #[test]
    fn persisted_as_display_names() {
        let mut store = empty_store();
        store.record_local("Pão Sírio", "padaria");
        let raw = store.storage().get(LOCAL_CORRECTIONS_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"{"pao sirio":"Padaria e Laticínios"}"#);
    }

    #[test]
    fn malformed_storage_is_empty() {
        let mut storage = MemoryStore::new();
        storage.set(LOCAL_CORRECTIONS_KEY, "not json at all").unwrap();
        let store = CorrectionStore::load(storage);
        assert_eq!(store.local_len(), 0);
    }

    #[test]
    fn corrupted_entries_are_not_honored() {
        let mut storage = MemoryStore::new();
        storage
            .set(
                LOCAL_CORRECTIONS_KEY,
                r#"{"picanha":"Churrasco","pilha":"Geral","Leite Ninho":"Padaria e Laticínios"}"#,
            )
            .unwrap();
        let store = CorrectionStore::load(storage);
        assert_eq!(store.lookup("picanha"), None);
        assert_eq!(store.lookup("pilha"), None);
        assert_eq!(store.lookup("leite ninho"), Some(Category::BakeryDairy));
    }

    #[test]
    fn clear_local_resets_storage() {
        let mut store = empty_store();
        store.record_local("cafe soluvel", "Bebidas");
        store.clear_local().unwrap();
        assert_eq!(store.lookup("cafe soluvel"), None);
        assert_eq!(store.storage().get(LOCAL_CORRECTIONS_KEY).unwrap(), None);
    }

    // ── Shared tier ───────────────────────────────────────────────────

    #[test]
    fn shared_takes_precedence() {
        let mut store = empty_store();
        store.replace_shared([("a", "Bebidas")]);
        assert!(store.record_local("a", "Mercearia"));
        assert_eq!(store.lookup("a"), Some(Category::Beverages));
    }

    #[test]
    fn local_used_when_shared_misses() {
        let mut store = empty_store();
        store.replace_shared([("b", "Bebidas")]);
        store.record_local("a", "Mercearia");
        assert_eq!(store.lookup("a"), Some(Category::Grocery));
    }

    #[test]
    fn replace_is_wholesale() {
        let mut store = empty_store();
        store.replace_shared([("a", "Bebidas"), ("b", "Hortifruti")]);
        store.replace_shared([("c", "Mercearia")]);
        assert_eq!(store.shared_len(), 1);
        assert_eq!(store.lookup("a"), None);
        assert_eq!(store.lookup("c"), Some(Category::Grocery));
    }

    #[test]
    fn first_snapshot_row_wins() {
        let mut store = empty_store();
        store.replace_shared([
            ("Suco Del Valle", "Bebidas"),
            ("suco del valle", "Mercearia"),
        ]);
        assert_eq!(store.lookup("suco del valle"), Some(Category::Beverages));
    }

    #[test]
    fn shared_snapshot_filters_invalid_rows() {
        let mut store = empty_store();
        store.replace_shared([("", "Bebidas"), ("picanha", "Churrasco"), ("x", "Geral")]);
        assert_eq!(store.shared_len(), 0);
    }

    // ── Entries ───────────────────────────────────────────────────────

    #[test]
    fn entry_validation() {
        let entry = CorrectionEntry::new("  Pão de Queijo ", "Padaria", "").unwrap();
        assert_eq!(entry.normalized_name, "pao de queijo");
        assert_eq!(entry.category, Category::BakeryDairy);
        assert_eq!(entry.sample_name, "Pão de Queijo");
        assert_eq!(entry.updated_by, "Colaborador");

        assert!(CorrectionEntry::new("x", "Geral", "Ana").is_none());
        assert!(CorrectionEntry::new("", "Bebidas", "Ana").is_none());
    }

    #[test]
    fn entry_wire_names() {
        let entry = CorrectionEntry::new("Guaraná", "Bebidas", "Ana").unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["normalized_name"], "guarana");
        assert_eq!(json["categoria"], "Bebidas");
        assert_eq!(json["updated_by_nome"], "Ana");
    }
}
