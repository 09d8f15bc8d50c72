//! Time-Bounded Classification
//!
//! Runs a classifier on the blocking pool under a per-record time budget.
//! A timeout, an error or a panic never aborts the run: the record receives
//! the label's default with zero confidence and a fallback marker.
//!
//! ## Usage
//!
//! ```ignore
//! let c = classify_bounded(classifiers.sentiment.clone(), text, Duration::from_secs(2)).await;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::{FallbackLabel, SharedClassifier};
use crate::types::{Classification, Fallback, PulseError, Result};

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(PulseError::timeout(operation_name, timeout)),
    }
}

/// Classify `text`, substituting the default label on timeout or failure
///
/// The blocking task is detached when the budget expires; its late result is
/// discarded.
pub async fn classify_bounded<L: FallbackLabel>(
    classifier: SharedClassifier<L>,
    text: Arc<str>,
    timeout: Duration,
) -> Classification<L> {
    let name = classifier.name();
    let task = tokio::task::spawn_blocking(move || classifier.classify(&text));

    let result = with_timeout(
        timeout,
        async move {
            task.await
                .map_err(|e| PulseError::classifier(name, format!("task aborted: {}", e)))?
        },
        name,
    )
    .await;

    match result {
        Ok(classification) => classification,
        Err(err) => {
            let reason = match err {
                PulseError::Timeout { .. } => Fallback::Timeout,
                _ => Fallback::Failure,
            };
            warn!("{} classifier fell back to default: {}", name, err);
            Classification::fallback(L::DEFAULT, 0.0, reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::types::{Sentiment, Topic};

    struct Slow(Duration);

    impl Classifier<Sentiment> for Slow {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn classify(&self, _text: &str) -> Result<Classification<Sentiment>> {
            std::thread::sleep(self.0);
            Ok(Classification::new(Sentiment::Positive, 1.0))
        }
    }

    struct Failing;

    impl Classifier<Topic> for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn classify(&self, _text: &str) -> Result<Classification<Topic>> {
            Err(PulseError::classifier("failing", "model unavailable"))
        }
    }

    struct Panicking;

    impl Classifier<Topic> for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn classify(&self, _text: &str) -> Result<Classification<Topic>> {
            panic!("classifier bug")
        }
    }

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, PulseError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, PulseError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), PulseError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_fast_classifier_passes_through() {
        let classifier: SharedClassifier<Sentiment> = Arc::new(Slow(Duration::ZERO));
        let c = classify_bounded(classifier, Arc::from("fine"), Duration::from_secs(1)).await;
        assert_eq!(c.label, Sentiment::Positive);
        assert!(!c.is_fallback());
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_neutral() {
        let classifier: SharedClassifier<Sentiment> = Arc::new(Slow(Duration::from_millis(300)));
        let c = classify_bounded(classifier, Arc::from("anything"), Duration::from_millis(20)).await;
        assert_eq!(c.label, Sentiment::Neutral);
        assert_eq!(c.confidence, 0.0);
        assert_eq!(c.fallback, Some(Fallback::Timeout));
    }

    #[tokio::test]
    async fn test_error_falls_back_to_other() {
        let classifier: SharedClassifier<Topic> = Arc::new(Failing);
        let c = classify_bounded(classifier, Arc::from("x"), Duration::from_secs(1)).await;
        assert_eq!(c.label, Topic::Other);
        assert_eq!(c.fallback, Some(Fallback::Failure));
    }

    #[tokio::test]
    async fn test_panic_falls_back_to_other() {
        let classifier: SharedClassifier<Topic> = Arc::new(Panicking);
        let c = classify_bounded(classifier, Arc::from("x"), Duration::from_secs(1)).await;
        assert_eq!(c.label, Topic::Other);
        assert_eq!(c.fallback, Some(Fallback::Failure));
    }
}
