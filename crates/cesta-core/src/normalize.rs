//! Text normalization pipeline for shopping item names.
//!
//! Every string that reaches the scorer, the correction store or the category
//! parser goes through [`normalize`] first, so comparisons never depend on
//! platform locale state. The collation rule is fixed: case fold, canonical
//! decomposition, combining marks removed, anything that is not a letter,
//! digit or whitespace replaced by a space, whitespace collapsed.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Apply the full normalization pipeline.
///
/// Levels applied in order:
/// 1. Case folding
/// 2. Canonical decomposition (NFD) + combining mark removal
/// 3. Punctuation and symbols replaced by spaces
/// 4. Whitespace collapse
///
/// Total over any input; empty or punctuation-only input yields `""`.
pub fn normalize(s: &str) -> String {
    let s = s.to_lowercase();
    let s = strip_accents(&s);
    let s = replace_punctuation(&s);
    collapse_whitespace(&s)
}

/// Split the normalized form of `s` into tokens.
pub fn tokenize(s: &str) -> Vec<String> {
    tokens(&normalize(s)).map(str::to_owned).collect()
}

/// Tokens of an already-normalized string, without allocating.
pub(crate) fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split(' ').filter(|t| !t.is_empty())
}

// ── Level 2: Decomposition + mark removal ─────────────────────────────

/// Decompose (NFD) and drop combining marks: "pão" → "pao", "açúcar" → "acucar".
pub(crate) fn strip_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

// ── Level 3: Punctuation ──────────────────────────────────────────────

/// Symbols that are Alphabetic without being letters: circled, squared and
/// negative-circled Latin letters (gc=So).
const LETTER_SYMBOLS: &[(char, char)] = &[
    ('\u{24B6}', '\u{24E9}'),
    ('\u{1F130}', '\u{1F149}'),
    ('\u{1F150}', '\u{1F169}'),
    ('\u{1F170}', '\u{1F189}'),
];

/// Letter (gc=L), number (gc=N) or whitespace.
fn is_word_char(c: char) -> bool {
    if c.is_whitespace() {
        return true;
    }
    c.is_alphanumeric()
        && !LETTER_SYMBOLS
            .iter()
            .any(|&(lo, hi)| (lo..=hi).contains(&c))
}

/// Replace every char that is not a letter, digit or whitespace with a space.
///
/// Unlike deletion, this keeps "pão-de-forma" as three words.
fn replace_punctuation(s: &str) -> String {
    s.chars()
        .map(|c| {
            if is_word_char(c) {
                c
            } else {
                ' '
            }
        })
        .collect()
}

// ── Level 4: Whitespace collapse ──────────────────────────────────────

/// Trim and collapse whitespace runs to a single space.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
