//! Word Tokenizer
//!
//! Splits normalized feedback text into lowercase word tokens. Contractions
//! such as `wasn't` stay a single token so negations are recognized.

use regex::Regex;
use std::sync::LazyLock;

static WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]+(?:'[a-z]+)?").expect("valid word regex"));

/// Tokenize text into lowercase words
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");
    WORD_REGEX
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Check whether `phrase` (already tokenized) occurs as consecutive tokens
pub fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    match phrase.len() {
        0 => false,
        1 => tokens.iter().any(|t| *t == phrase[0]),
        n => tokens.windows(n).any(|w| w == phrase),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        assert_eq!(
            tokenize("Staff were RUDE, again!"),
            vec!["staff", "were", "rude", "again"]
        );
    }

    #[test]
    fn test_tokenize_keeps_contractions() {
        assert_eq!(tokenize("It wasn’t clean"), vec!["it", "wasn't", "clean"]);
    }

    #[test]
    fn test_contains_phrase() {
        let tokens = tokenize("the community center pool is closed");
        let phrase = tokenize("community center");
        assert!(contains_phrase(&tokens, &phrase));
        assert!(!contains_phrase(&tokens, &tokenize("center community")));
        assert!(!contains_phrase(&tokens, &[]));
    }
}
