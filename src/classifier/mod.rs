//! Text Classifiers
//!
//! Sentiment and topic classifiers are pure functions of (text, threshold).
//! The pipeline owns them behind `Arc<dyn Classifier<L>>` and calls them
//! through a time-bounded adapter that turns timeouts, errors and panics into
//! the label's default value.

pub mod lexicon;
pub mod sentiment;
pub mod timeout;
pub mod tokenizer;
pub mod topic;

pub use sentiment::{LexiconSentimentClassifier, PolarityScore};
pub use timeout::{classify_bounded, with_timeout};
pub use topic::{KeywordTopicClassifier, TOPIC_RULES, TopicRule};

use std::sync::Arc;

use crate::types::{Classification, Result, Sentiment, Topic};

/// Label set with a default used whenever classification cannot decide
pub trait FallbackLabel: Copy + Send + Sync + 'static {
    const DEFAULT: Self;
}

impl FallbackLabel for Sentiment {
    const DEFAULT: Self = Sentiment::Neutral;
}

impl FallbackLabel for Topic {
    const DEFAULT: Self = Topic::Other;
}

/// Stateless text classifier
///
/// Implementations must not keep state across calls: the same text always
/// yields the same classification regardless of call order or thread.
pub trait Classifier<L: FallbackLabel>: Send + Sync {
    /// Short name used in logs and diagnostics
    fn name(&self) -> &'static str;

    /// Classify one normalized text, applying the configured threshold
    fn classify(&self, text: &str) -> Result<Classification<L>>;
}

pub type SharedClassifier<L> = Arc<dyn Classifier<L>>;

/// Pair of classifiers used by the pipeline
#[derive(Clone)]
pub struct ClassifierSet {
    pub sentiment: SharedClassifier<Sentiment>,
    pub topic: SharedClassifier<Topic>,
}

impl ClassifierSet {
    /// Built-in lexicon and keyword classifiers
    pub fn standard(sentiment_threshold: f64, topic_threshold: f64) -> Self {
        Self {
            sentiment: Arc::new(LexiconSentimentClassifier::new(sentiment_threshold)),
            topic: Arc::new(KeywordTopicClassifier::new(topic_threshold)),
        }
    }

    pub fn new(sentiment: SharedClassifier<Sentiment>, topic: SharedClassifier<Topic>) -> Self {
        Self { sentiment, topic }
    }
}
