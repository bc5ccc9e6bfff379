//! Token-pair scoring on a fixed tier scale.
//!
//! Strategy: exact → singular-equal → one edit away → prefix → substring → 0.

use crate::morphology::singularize;

/// Identical tokens.
pub const SCORE_EXACT: u32 = 4;
/// Equal after singularization ("ovos" / "ovo").
pub const SCORE_SINGULAR: u32 = 3;
/// One edit apart after singularization, or one is a long prefix of the other.
pub const SCORE_NEAR: u32 = 2;
/// One long token contains the other.
pub const SCORE_SUBSTRING: u32 = 1;

/// Shorter token must be at least this long for the prefix tier.
const MIN_PREFIX_LEN: usize = 4;
/// Shorter token must be at least this long for the substring and edit tiers.
const MIN_FUZZY_LEN: usize = 5;

/// Score an input token against a keyword token. Returns a value in `0..=4`.
pub fn score_tokens(input: &str, keyword: &str) -> u32 {
    if input.is_empty() || keyword.is_empty() {
        return 0;
    }

    if input == keyword {
        return SCORE_EXACT;
    }

    let input_singular = singularize(input);
    let keyword_singular = singularize(keyword);
    if input_singular == keyword_singular {
        return SCORE_SINGULAR;
    }

    if is_one_edit_away(&input_singular, &keyword_singular) {
        return SCORE_NEAR;
    }

    let min_len = input.chars().count().min(keyword.chars().count());
    if min_len >= MIN_PREFIX_LEN && (input.starts_with(keyword) || keyword.starts_with(input)) {
        return SCORE_NEAR;
    }

    if min_len >= MIN_FUZZY_LEN && (input.contains(keyword) || keyword.contains(input)) {
        return SCORE_SUBSTRING;
    }

    0
}

/// Fast approximate check for edit distance 1.
///
/// A single two-pointer walk: on a mismatch the pointer of the longer string
/// advances (or both, for equal lengths), and anything left over at the end
/// counts as one more edit. Pairs that need realignment beyond that walk are
/// rejected even when their true Levenshtein distance is 1. Scoring
/// thresholds are tuned against exactly this behavior.
pub fn is_one_edit_away(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (len_a, len_b) = (a.len(), b.len());

    if len_a == 0 || len_b == 0 {
        return false;
    }
    if len_a.abs_diff(len_b) > 1 {
        return false;
    }
    if len_a.min(len_b) < MIN_FUZZY_LEN {
        return false;
    }

    let (mut i, mut j) = (0, 0);
    let mut edits = 0;

    while i < len_a && j < len_b {
        if a[i] == b[j] {
            i += 1;
            j += 1;
            continue;
        }

        edits += 1;
        if edits > 1 {
            return false;
        }

        if len_a > len_b {
            i += 1;
        } else if len_b > len_a {
            j += 1;
        } else {
            i += 1;
            j += 1;
        }
    }

    if i < len_a || j < len_b {
        edits += 1;
    }
    edits <= 1
}
