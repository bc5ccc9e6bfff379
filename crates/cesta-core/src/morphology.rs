//! Approximate Portuguese singularization for token matching.
//!
//! This is a heuristic, not a morphological analyzer. It only needs to make
//! "limoes" meet "limao" and "ovos" meet "ovo"; false positives are accepted.

/// Plural suffix rewrites, tried in order. The first match wins.
const PLURAL_RULES: &[(&str, &str)] = &[
    ("oes", "ao"),
    ("aes", "ao"),
    ("ais", "al"),
    ("eis", "el"),
    ("ois", "ol"),
    ("is", "il"),
];

/// Minimum length a token must have for a bare trailing "s" to be dropped.
const MIN_LEN_FOR_S_STRIP: usize = 4;

/// Reduce a normalized token to an approximate singular form.
///
/// Exactly one rule fires; tokens matching none are returned unchanged.
pub fn singularize(token: &str) -> String {
    for &(suffix, replacement) in PLURAL_RULES {
        if let Some(stem) = token.strip_suffix(suffix) {
            return format!("{stem}{replacement}");
        }
    }

    if token.chars().count() >= MIN_LEN_FOR_S_STRIP {
        if let Some(stem) = token.strip_suffix('s') {
            return stem.to_string();
        }
    }

    token.to_string()
}
