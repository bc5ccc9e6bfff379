//! Category classification for free-text item names.
//!
//! Flow: normalize → correction lookup → keyword scoring → tie-break.

use std::sync::LazyLock;

use crate::category::Category;
use crate::corrections::{Corrections, NoCorrections};
use crate::lexicon::Lexicon;
use crate::normalize::{normalize, tokens};
use crate::scorer::score_category;

/// The top category needs at least this many points.
pub const MIN_CONFIDENCE: u32 = 3;

/// A runner-up within this many points makes the result ambiguous.
pub const AMBIGUITY_MARGIN: u32 = 1;

static DEFAULT: LazyLock<Classifier> = LazyLock::new(Classifier::new);

/// How a classification was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// The name normalized to nothing.
    Empty,
    /// A learned correction overrode the scorer.
    Correction,
    /// Keyword scores, ranked best first.
    Keywords(Vec<(Category, u32)>),
}

/// Result of classifying one name, with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub normalized: String,
    pub source: Source,
}

/// Keyword classifier over a fixed lexicon.
#[derive(Debug, Clone)]
pub struct Classifier {
    lexicon: Lexicon,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Classifier over the built-in lexicon.
    pub fn new() -> Self {
        Self::with_lexicon(Lexicon::builtin().clone())
    }

    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Process-wide classifier over the built-in lexicon.
    pub fn shared() -> &'static Classifier {
        &DEFAULT
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Classify a raw item name. Never fails; falls back to `General`.
    pub fn classify(&self, raw: &str, corrections: &impl Corrections) -> Category {
        self.explain(raw, corrections).category
    }

    /// Classify a raw item name, returning the evidence used.
    #[tracing::instrument(name = "classify", skip(self, corrections), fields(name = %raw))]
    pub fn explain(&self, raw: &str, corrections: &impl Corrections) -> Classification {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Classification {
                category: Category::General,
                normalized,
                source: Source::Empty,
            };
        }

        if let Some(category) = corrections.lookup(&normalized).filter(Category::is_scored) {
            tracing::debug!(category = %category, "Correction hit");
            return Classification {
                category,
                normalized,
                source: Source::Correction,
            };
        }

        let input_tokens: Vec<&str> = tokens(&normalized).collect();
        if input_tokens.is_empty() {
            return Classification {
                category: Category::General,
                normalized,
                source: Source::Empty,
            };
        }

        let ranked = self.rank(&normalized, &input_tokens);
        let category = pick_winner(&ranked);
        tracing::debug!(category = %category, scores = ?ranked, "Keyword classification");

        Classification {
            category,
            normalized,
            source: Source::Keywords(ranked),
        }
    }

    /// Score every lexicon category and sort best first.
    ///
    /// The sort is stable, so equal scores keep lexicon order.
    fn rank(&self, normalized: &str, input_tokens: &[&str]) -> Vec<(Category, u32)> {
        let mut ranked: Vec<(Category, u32)> = self
            .lexicon
            .iter()
            .filter(|(category, _)| category.is_scored())
            .map(|(category, phrases)| {
                (category, score_category(normalized, input_tokens, phrases))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

/// Tie-break policy over ranked scores (best first).
///
/// `General` when there is no candidate, the top score is below
/// [`MIN_CONFIDENCE`], or a non-zero runner-up is within [`AMBIGUITY_MARGIN`].
pub fn pick_winner(ranked: &[(Category, u32)]) -> Category {
    let Some(&(best, best_score)) = ranked.first() else {
        return Category::General;
    };
    if best_score < MIN_CONFIDENCE {
        return Category::General;
    }
    if let Some(&(_, second_score)) = ranked.get(1) {
        if second_score > 0 && best_score - second_score <= AMBIGUITY_MARGIN {
            return Category::General;
        }
    }
    best
}

/// Classify with the built-in lexicon, consulting `corrections` first.
pub fn classify(raw: &str, corrections: &impl Corrections) -> Category {
    Classifier::shared().classify(raw, corrections)
}

/// Classify with the built-in lexicon and no correction layer.
pub fn classify_by_keywords(raw: &str) -> Category {
    Classifier::shared().classify(raw, &NoCorrections)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::corrections::CorrectionStore;
    use crate::storage::MemoryStore;

    // ── Keyword classification ────────────────────────────────────────

    #[test]
    fn empty_is_general() {
        assert_eq!(classify_by_keywords(""), Category::General);
        assert_eq!(classify_by_keywords("  !!  "), Category::General);
        assert_eq!(
            Classifier::shared().explain("", &NoCorrections).source,
            Source::Empty
        );
    }

    #[test]
    fn multi_word_keyword() {
        assert_eq!(classify_by_keywords("arroz branco"), Category::Grocery);
    }

    #[test]
    fn no_signal_is_general() {
        assert_eq!(classify_by_keywords("xyz999"), Category::General);
    }

    #[test]
    fn common_items() {
        assert_eq!(classify_by_keywords("Detergente Ypê"), Category::CleaningHygiene);
        assert_eq!(classify_by_keywords("Bananas"), Category::Produce);
        assert_eq!(classify_by_keywords("Refrigerante 2L"), Category::Beverages);
        assert_eq!(classify_by_keywords("Ovos brancos"), Category::ProteinEggs);
    }

    #[test]
    fn plural_tolerant() {
        assert_eq!(classify_by_keywords("limões"), Category::Produce);
    }

    #[test]
    fn lone_typo_stays_below_floor() {
        // one edit away scores 2, under the confidence floor on its own
        assert_eq!(classify_by_keywords("detergenke"), Category::General);
        // with a second matching token the typo still counts
        assert_eq!(classify_by_keywords("papel higienco"), Category::CleaningHygiene);
    }

    #[test]
    fn never_returns_weighted() {
        for name in ["picanha", "churrasco", "carvão", "linguiça toscana", ""] {
            assert_ne!(classify_by_keywords(name), Category::Weighted);
        }
    }

    #[test]
    fn explain_reports_ranked_scores() {
        let result = Classifier::shared().explain("Arroz Branco", &NoCorrections);
        assert_eq!(result.normalized, "arroz branco");
        let Source::Keywords(scores) = result.source else {
            panic!("expected keyword scores");
        };
        assert_eq!(scores.len(), Category::SCORED.len());
        assert_eq!(scores[0].0, Category::Grocery);
        assert!(scores.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    // ── Tie-break policy ──────────────────────────────────────────────

    #[test]
    fn below_floor_is_general() {
        let ranked = [(Category::Grocery, 2), (Category::Produce, 0)];
        assert_eq!(pick_winner(&ranked), Category::General);
    }

    #[test]
    fn gap_of_one_is_ambiguous() {
        let ranked = [(Category::Grocery, 3), (Category::Produce, 2)];
        assert_eq!(pick_winner(&ranked), Category::General);
    }

    #[test]
    fn tie_is_ambiguous() {
        let ranked = [(Category::Grocery, 6), (Category::ProteinEggs, 6)];
        assert_eq!(pick_winner(&ranked), Category::General);
    }

    #[test]
    fn gap_of_two_wins() {
        let ranked = [(Category::Grocery, 4), (Category::Produce, 2)];
        assert_eq!(pick_winner(&ranked), Category::Grocery);
    }

    #[test]
    fn zero_runner_up_does_not_block() {
        let ranked = [(Category::Grocery, 3), (Category::Produce, 0)];
        assert_eq!(pick_winner(&ranked), Category::Grocery);
    }

    #[test]
    fn no_candidates() {
        assert_eq!(pick_winner(&[]), Category::General);
    }

    #[test]
    fn ambiguity_through_custom_lexicon() {
        // "tapioca" is singular-equal to "tapiocas" (3) and one edit from
        // "tapiocx" (2)
        let extra = HashMap::from([
            ("Mercearia".to_string(), vec!["tapiocas".to_string()]),
            ("Hortifruti".to_string(), vec!["tapiocx".to_string()]),
        ]);
        let classifier = Classifier::with_lexicon(Lexicon::with_extra(&extra));
        let result = classifier.explain("tapioca", &NoCorrections);
        let Source::Keywords(scores) = &result.source else {
            panic!("expected keyword scores");
        };
        assert_eq!(scores[0], (Category::Grocery, 3));
        assert_eq!(scores[1], (Category::Produce, 2));
        assert_eq!(result.category, Category::General);
    }

    // ── Corrections ───────────────────────────────────────────────────

    #[test]
    fn correction_bypasses_scoring() {
        let mut store = CorrectionStore::load(MemoryStore::new());
        store.record_local("Arroz Branco", "Bebidas");
        let result = Classifier::shared().explain("arroz  branco!", &store);
        assert_eq!(result.category, Category::Beverages);
        assert_eq!(result.source, Source::Correction);
    }

    #[test]
    fn correction_on_empty_name_is_ignored() {
        let store = CorrectionStore::load(MemoryStore::new());
        assert_eq!(classify("", &store), Category::General);
    }

    #[test]
    fn custom_lexicon_extends_classifier() {
        let extra = HashMap::from([("Laticínios".to_string(), vec!["yakult".to_string()])]);
        let classifier = Classifier::with_lexicon(Lexicon::with_extra(&extra));
        assert_eq!(
            classifier.classify("Yakult", &NoCorrections),
            Category::BakeryDairy
        );
        assert_eq!(classify_by_keywords("Yakult"), Category::General);
    }
}
