//! Lexicon Sentiment Classifier
//!
//! Scores tokens against the sentiment lexicon with intensity modifiers and a
//! negation window, then derives a polarity label and a confidence.

use super::lexicon::SentimentLexicon;
use super::tokenizer::tokenize;
use super::{Classifier, FallbackLabel};
use crate::constants::classify::{
    NEGATION_DAMPING, NEGATION_WINDOW, NEUTRAL_BAND, STRONG_POLARITY,
};
use crate::types::{Classification, Fallback, Result, Sentiment};

/// Raw polarity evidence for one text
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolarityScore {
    /// Mean of matched word scores, clamped to [-1, 1]
    pub polarity: f64,
    /// |Σ score| / Σ |score|, 1.0 when all evidence points the same way
    pub agreement: f64,
    /// Number of sentiment-bearing tokens
    pub hits: usize,
}

/// Stateless lexicon-based sentiment classifier
#[derive(Debug, Clone)]
pub struct LexiconSentimentClassifier {
    lexicon: &'static SentimentLexicon,
    threshold: f64,
    negation_window: usize,
}

impl LexiconSentimentClassifier {
    pub fn new(threshold: f64) -> Self {
        Self {
            lexicon: SentimentLexicon::standard(),
            threshold,
            negation_window: NEGATION_WINDOW,
        }
    }

    pub fn with_negation_window(mut self, window: usize) -> Self {
        self.negation_window = window;
        self
    }

    /// Compute polarity evidence for a text
    pub fn score(&self, text: &str) -> PolarityScore {
        let tokens = tokenize(text);

        let mut total = 0.0;
        let mut total_abs = 0.0;
        let mut hits = 0usize;
        let mut modifier = 1.0;
        let mut negation_active = false;
        let mut since_negation = 0usize;

        for token in &tokens {
            if self.lexicon.is_negation(token) {
                negation_active = true;
                since_negation = 0;
                continue;
            }

            if let Some(m) = self.lexicon.modifier(token) {
                modifier = m;
                continue;
            }

            if let Some(base) = self.lexicon.score(token) {
                let mut score = base * modifier;
                if negation_active && since_negation < self.negation_window {
                    score = -score * NEGATION_DAMPING;
                }
                total += score;
                total_abs += score.abs();
                hits += 1;
                modifier = 1.0;
            }

            if negation_active {
                since_negation += 1;
                if since_negation >= self.negation_window {
                    negation_active = false;
                }
            }
        }

        if hits == 0 {
            return PolarityScore::default();
        }

        PolarityScore {
            polarity: (total / hits as f64).clamp(-1.0, 1.0),
            agreement: if total_abs > 0.0 {
                total.abs() / total_abs
            } else {
                0.0
            },
            hits,
        }
    }

    /// Map polarity evidence to a label and confidence, before thresholding
    pub fn label(score: &PolarityScore) -> (Sentiment, f64) {
        if score.hits == 0 {
            return (Sentiment::Neutral, 0.0);
        }

        let strength = (score.polarity.abs() / STRONG_POLARITY).min(1.0);
        if score.polarity > NEUTRAL_BAND {
            (Sentiment::Positive, score.agreement * strength)
        } else if score.polarity < -NEUTRAL_BAND {
            (Sentiment::Negative, score.agreement * strength)
        } else {
            // Mixed evidence that cancels out is confidently neutral
            (Sentiment::Neutral, 1.0 - score.agreement)
        }
    }
}

impl Classifier<Sentiment> for LexiconSentimentClassifier {
    fn name(&self) -> &'static str {
        "sentiment"
    }

    fn classify(&self, text: &str) -> Result<Classification<Sentiment>> {
        let (label, confidence) = Self::label(&self.score(text));

        if confidence < self.threshold {
            return Ok(Classification::fallback(
                Sentiment::DEFAULT,
                confidence,
                Fallback::LowConfidence,
            ));
        }

        Ok(Classification::new(label, confidence))
    }
}
