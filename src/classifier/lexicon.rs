//! Sentiment Lexicon
//!
//! Word scores in [-1, 1], intensity modifiers and negation words tuned for
//! resident service feedback.

use std::collections::HashMap;
use std::sync::LazyLock;

const POSITIVE: &[(&str, f64)] = &[
    ("amazing", 0.9),
    ("excellent", 0.9),
    ("fantastic", 0.9),
    ("outstanding", 0.9),
    ("perfect", 0.9),
    ("wonderful", 0.9),
    ("awesome", 0.8),
    ("best", 0.8),
    ("great", 0.8),
    ("love", 0.8),
    ("loved", 0.8),
    ("beautiful", 0.7),
    ("courteous", 0.7),
    ("friendly", 0.7),
    ("happy", 0.7),
    ("helpful", 0.7),
    ("pleased", 0.7),
    ("appreciate", 0.6),
    ("appreciated", 0.6),
    ("efficient", 0.6),
    ("enjoy", 0.6),
    ("enjoyed", 0.6),
    ("good", 0.6),
    ("improved", 0.6),
    ("kind", 0.6),
    ("polite", 0.6),
    ("professional", 0.6),
    ("prompt", 0.6),
    ("responsive", 0.6),
    ("satisfied", 0.6),
    ("clean", 0.5),
    ("fast", 0.5),
    ("improvement", 0.5),
    ("nice", 0.5),
    ("quick", 0.5),
    ("resolved", 0.5),
    ("safe", 0.5),
    ("smooth", 0.5),
    ("thank", 0.5),
    ("thanks", 0.5),
    ("easy", 0.4),
    ("fixed", 0.4),
];

const NEGATIVE: &[(&str, f64)] = &[
    ("awful", -0.9),
    ("horrible", -0.9),
    ("terrible", -0.9),
    ("worst", -0.9),
    ("filthy", -0.8),
    ("hate", -0.8),
    ("rude", -0.8),
    ("unacceptable", -0.8),
    ("useless", -0.8),
    ("angry", -0.7),
    ("dangerous", -0.7),
    ("disappointed", -0.7),
    ("disappointing", -0.7),
    ("frustrated", -0.7),
    ("frustrating", -0.7),
    ("overcharged", -0.7),
    ("unhelpful", -0.7),
    ("unresponsive", -0.7),
    ("unsafe", -0.7),
    ("annoying", -0.6),
    ("bad", -0.6),
    ("broken", -0.6),
    ("dirty", -0.6),
    ("ignored", -0.6),
    ("neglected", -0.6),
    ("poor", -0.6),
    ("waste", -0.6),
    ("confused", -0.5),
    ("confusing", -0.5),
    ("delay", -0.5),
    ("delayed", -0.5),
    ("leaking", -0.5),
    ("missed", -0.5),
    ("slow", -0.5),
    ("wrong", -0.5),
    ("complaint", -0.4),
    ("difficult", -0.4),
    ("expensive", -0.4),
    ("late", -0.4),
    ("leak", -0.4),
    ("noisy", -0.4),
    ("pothole", -0.4),
    ("potholes", -0.4),
    ("problem", -0.4),
    ("problems", -0.4),
    ("crowded", -0.3),
    ("issue", -0.3),
    ("issues", -0.3),
    ("loud", -0.3),
];

const MODIFIERS: &[(&str, f64)] = &[
    ("extremely", 1.8),
    ("incredibly", 1.7),
    ("very", 1.5),
    ("super", 1.5),
    ("really", 1.3),
    ("so", 1.2),
    ("quite", 1.2),
    ("too", 1.2),
    ("somewhat", 0.6),
    ("slightly", 0.5),
    ("barely", 0.4),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nobody", "nothing", "none", "neither", "nor", "hardly", "without",
    "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't", "weren't", "can't", "cannot",
    "won't", "wouldn't", "couldn't", "shouldn't", "haven't", "hasn't",
];

static DEFAULT_LEXICON: LazyLock<SentimentLexicon> = LazyLock::new(SentimentLexicon::build);

/// Immutable word-score dictionary
#[derive(Debug, Clone)]
pub struct SentimentLexicon {
    scores: HashMap<&'static str, f64>,
    modifiers: HashMap<&'static str, f64>,
    negations: Vec<&'static str>,
}

impl SentimentLexicon {
    /// Shared built-in lexicon
    pub fn standard() -> &'static SentimentLexicon {
        &DEFAULT_LEXICON
    }

    fn build() -> Self {
        Self {
            scores: POSITIVE.iter().chain(NEGATIVE).copied().collect(),
            modifiers: MODIFIERS.iter().copied().collect(),
            negations: NEGATIONS.to_vec(),
        }
    }

    /// Score in [-1, 1] for a sentiment-bearing word
    pub fn score(&self, word: &str) -> Option<f64> {
        self.scores.get(word).copied()
    }

    /// Intensity multiplier for the next sentiment word
    pub fn modifier(&self, word: &str) -> Option<f64> {
        self.modifiers.get(word).copied()
    }

    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(&word)
    }
}
