use crate::lexicon::Phrase;
use crate::matcher::score_tokens;

/// Points for a keyword phrase found verbatim inside the normalized name.
pub const SCORE_PHRASE_HIT: u32 = 6;

/// Score a normalized name against one category's keyword phrases.
///
/// A phrase contained in the name adds [`SCORE_PHRASE_HIT`] and skips token
/// matching. Otherwise the best token-pair score across all
/// `(input token, phrase token)` pairs is added. Points accumulate over every
/// phrase of the category.
pub fn score_category(normalized_name: &str, input_tokens: &[&str], phrases: &[Phrase]) -> u32 {
    phrases
        .iter()
        .map(|phrase| score_phrase(normalized_name, input_tokens, phrase))
        .sum()
}

fn score_phrase(normalized_name: &str, input_tokens: &[&str], phrase: &Phrase) -> u32 {
    if normalized_name.contains(phrase.text()) {
        return SCORE_PHRASE_HIT;
    }

    input_tokens
        .iter()
        .flat_map(|input| {
            phrase
                .tokens()
                .iter()
                .map(move |keyword| score_tokens(input, keyword))
        })
        .max()
        .unwrap_or(0)
}
