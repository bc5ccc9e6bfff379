//! Keyword reference data, compiled once and shared by every classifier.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::category::{normalize_category, Category};
use crate::normalize::{normalize, tokens};

/// Built-in keyword phrases per scored category, in lexicon order.
const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::CleaningHygiene,
        &[
            "detergente",
            "sabao",
            "alcool",
            "alcool 70",
            "casa perfume",
            "casa e perfume",
            "perfume",
            "odorizador",
            "aromatizador",
            "amaciante",
            "agua sanitaria",
            "desinfetante",
            "esponja",
            "papel higienico",
            "papel toalha",
            "pano de prato",
            "creme dental",
            "pasta de dente",
            "escova de dente",
            "sabonete",
            "shampoo",
            "condicionador",
            "absorvente",
        ],
    ),
    (
        Category::BakeryDairy,
        &[
            "pao",
            "pao de forma",
            "bisnaguinha",
            "leite",
            "queijo",
            "mussarela",
            "manteiga",
            "requeijao",
            "iogurte",
            "danone",
            "coalhada",
            "creme de leite",
            "nata",
        ],
    ),
    (
        Category::Produce,
        &[
            "banana", "maca", "mamao", "manga", "uva", "laranja", "limao", "abacaxi", "tomate",
            "cebola", "alho", "alface", "couve", "brocolis", "batata", "cenoura", "pepino",
            "fruta", "verdura", "legume",
        ],
    ),
    (
        Category::Beverages,
        &[
            "agua",
            "suco",
            "refrigerante",
            "cerveja",
            "vinho",
            "whisky",
            "vodka",
            "energetico",
            "cha",
            "cafe",
        ],
    ),
    (
        Category::Grocery,
        &[
            "arroz", "feijao", "macarrao", "farinha", "acucar", "sal", "oleo", "azeite",
            "maionese", "ketchup", "granola", "mostarda", "molho", "extrato", "atum", "milho",
            "ervilha", "biscoito", "bolacha",
        ],
    ),
    (
        Category::ProteinEggs,
        &[
            "ovo",
            "ovos",
            "frango",
            "carne",
            "peixe",
            "sardinha",
            "linguica",
            "salsicha",
            "peru",
            "bacon",
            "presunto",
        ],
    ),
];

static BUILTIN: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon {
        entries: KEYWORDS
            .iter()
            .map(|&(category, phrases)| {
                let phrases = phrases.iter().filter_map(|p| Phrase::new(p)).collect();
                (category, phrases)
            })
            .collect(),
    }
});

/// A keyword phrase in normalized form, pre-tokenized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    text: String,
    tokens: Vec<String>,
}

impl Phrase {
    /// Normalize a raw phrase. Returns `None` if nothing survives normalization.
    pub fn new(raw: &str) -> Option<Self> {
        let text = normalize(raw);
        if text.is_empty() {
            return None;
        }
        let tokens = tokens(&text).map(str::to_owned).collect();
        Some(Self { text, tokens })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// Mapping from scored category to its ordered keyword phrases.
#[derive(Debug, Clone)]
pub struct Lexicon {
    entries: Vec<(Category, Vec<Phrase>)>,
}

impl Lexicon {
    /// The built-in reference lexicon.
    pub fn builtin() -> &'static Lexicon {
        &BUILTIN
    }

    /// Built-in lexicon extended with extra phrases keyed by raw category name.
    ///
    /// Names that do not parse to a scored category are skipped. Duplicate
    /// phrases are not added twice.
    pub fn with_extra(extra: &HashMap<String, Vec<String>>) -> Self {
        let mut lexicon = BUILTIN.clone();
        for (raw_category, phrases) in extra {
            let category = normalize_category(raw_category);
            if !category.is_scored() {
                tracing::warn!(category = %raw_category, "Ignoring extra keywords for unscored category");
                continue;
            }
            let Some((_, existing)) = lexicon.entries.iter_mut().find(|(c, _)| *c == category) else {
                continue;
            };
            for phrase in phrases.iter().filter_map(|p| Phrase::new(p)) {
                if !existing.contains(&phrase) {
                    existing.push(phrase);
                }
            }
        }
        lexicon
    }

    /// Iterate `(category, phrases)` in lexicon order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Phrase])> {
        self.entries.iter().map(|(c, p)| (*c, p.as_slice()))
    }

    pub fn phrases(&self, category: Category) -> &[Phrase] {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, p)| p.as_slice())
            .unwrap_or(&[])
    }
}
