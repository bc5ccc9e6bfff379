use std::collections::BTreeMap;

use wasm_bindgen::prelude::*;

use cesta_core::corrections::{CorrectionStore, NoCorrections, LOCAL_CORRECTIONS_KEY};
use cesta_core::storage::{KeyValueStore, MemoryStore};

/// JS `null` / `undefined` arrive as `None` and read as an empty string.
fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

#[wasm_bindgen]
pub fn normalize(input: Option<String>) -> String {
    cesta_core::normalize(text(&input))
}

/// Keyword-only classification; returns the category display name.
#[wasm_bindgen]
pub fn classify(name: Option<String>) -> String {
    cesta_core::classify(text(&name), &NoCorrections).to_string()
}

#[wasm_bindgen(js_name = normalizeCategory)]
pub fn normalize_category(raw: Option<String>) -> String {
    cesta_core::normalize_category(text(&raw)).to_string()
}

#[wasm_bindgen(js_name = anchorSlug)]
pub fn anchor_slug(raw: Option<String>) -> String {
    cesta_core::anchor_slug(text(&raw))
}

/// Classifier carrying its own correction store.
///
/// The host persists `localJson()` and passes it back to the constructor.
#[wasm_bindgen(js_name = Classifier)]
pub struct WasmClassifier {
    store: CorrectionStore<MemoryStore>,
}

#[wasm_bindgen(js_class = Classifier)]
impl WasmClassifier {
    #[wasm_bindgen(constructor)]
    pub fn new(local_json: Option<String>) -> WasmClassifier {
        let mut storage = MemoryStore::new();
        if let Some(json) = local_json {
            // MemoryStore writes cannot fail.
            let _ = storage.set(LOCAL_CORRECTIONS_KEY, &json);
        }
        Self {
            store: CorrectionStore::load(storage),
        }
    }

    pub fn classify(&self, name: Option<String>) -> String {
        cesta_core::classify(text(&name), &self.store).to_string()
    }

    /// Record a correction. Returns `false` for an empty name or a
    /// `Geral`/`Churrasco` category.
    #[wasm_bindgen(js_name = recordLocal)]
    pub fn record_local(&mut self, name: Option<String>, category: Option<String>) -> bool {
        self.store.record_local(text(&name), text(&category))
    }

    /// Install a shared snapshot given as a JSON array of
    /// `{normalized_name, categoria}` rows, newest first.
    ///
    /// Returns the number of entries kept; malformed input installs nothing.
    #[wasm_bindgen(js_name = replaceShared)]
    pub fn replace_shared(&mut self, rows_json: Option<String>) -> usize {
        let rows: Vec<cesta_core::shared::SharedCorrectionRow> =
            serde_json::from_str(text(&rows_json)).unwrap_or_default();
        self.store.replace_shared(
            rows.into_iter()
                .map(|row| (row.normalized_name, row.category)),
        );
        self.store.shared_len()
    }

    #[wasm_bindgen(js_name = clearLocal)]
    pub fn clear_local(&mut self) {
        let _ = self.store.clear_local();
    }

    /// Local corrections as a `{ name: category }` JSON object.
    #[wasm_bindgen(js_name = localJson)]
    pub fn local_json(&self) -> String {
        let entries: BTreeMap<&str, &str> = self
            .store
            .local_entries()
            .into_iter()
            .map(|(name, category)| (name, category.as_str()))
            .collect();
        serde_json::to_string(&entries).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn free_functions() {
        assert_eq!(normalize(some("  Açúcar   REFINADO ")), "acucar refinado");
        assert_eq!(classify(some("Detergente Ypê")), "Limpeza e Higiene");
        assert_eq!(normalize_category(some("peso")), "Churrasco");
        assert_eq!(anchor_slug(some("Proteínas e Ovos")), "proteinas-e-ovos");
    }

    #[test]
    fn missing_arguments_are_empty_text() {
        assert_eq!(classify(None), "Geral");
        assert_eq!(normalize(None), "");
        assert_eq!(normalize_category(None), "Geral");
        assert_eq!(anchor_slug(None), "");

        let mut classifier = WasmClassifier::new(None);
        assert_eq!(classifier.classify(None), "Geral");
        assert!(!classifier.record_local(None, some("Bebidas")));
        assert!(!classifier.record_local(some("cafe"), None));
        assert_eq!(classifier.replace_shared(None), 0);
        assert_eq!(classifier.local_json(), "{}");
    }

    #[test]
    fn handle_roundtrips_local_corrections() {
        let mut classifier = WasmClassifier::new(None);
        assert_eq!(classifier.classify(some("Pilhas AA")), "Geral");
        assert!(classifier.record_local(some("Pilhas AA"), some("Limpeza")));
        assert!(!classifier.record_local(some("Pilhas AA"), some("Geral")));
        assert_eq!(classifier.classify(some("pilhas aa")), "Limpeza e Higiene");

        let saved = classifier.local_json();
        let restored = WasmClassifier::new(Some(saved));
        assert_eq!(restored.classify(some("PILHAS AA")), "Limpeza e Higiene");
    }

    #[test]
    fn shared_snapshot_overrides_local() {
        let mut classifier = WasmClassifier::new(some(r#"{"cafe":"Mercearia"}"#));
        let kept = classifier.replace_shared(some(
            r#"[{"normalized_name":"cafe","categoria":"Bebidas"},{"normalized_name":"","categoria":"Bebidas"}]"#,
        ));
        assert_eq!(kept, 1);
        assert_eq!(classifier.classify(some("Café")), "Bebidas");
        assert_eq!(classifier.replace_shared(some("not json")), 0);
        assert_eq!(classifier.classify(some("Café")), "Mercearia");
    }
}
