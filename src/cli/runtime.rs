//! Command Runtime
//!
//! Drives a command future on a multi-threaded tokio runtime. Classifications
//! that outlived their time budget may still occupy the blocking pool when the
//! command returns; the runtime is shut down without waiting for them.

use std::future::Future;

use tokio::runtime::Runtime;
use tracing::debug;

use crate::types::Result;

/// Run `future` to completion, then drop the runtime without joining
/// detached blocking tasks
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = Runtime::new()?;
    let output = rt.block_on(future);
    debug!("Shutting down runtime");
    rt.shutdown_background();
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classifier, SharedClassifier, classify_bounded};
    use crate::types::{Classification, Fallback, Sentiment};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    struct Hung;

    impl Classifier<Sentiment> for Hung {
        fn name(&self) -> &'static str {
            "hung"
        }

        fn classify(&self, _text: &str) -> Result<Classification<Sentiment>> {
            std::thread::sleep(Duration::from_secs(5));
            Ok(Classification::new(Sentiment::Positive, 1.0))
        }
    }

    #[test]
    fn test_hung_classification_does_not_delay_exit() {
        let started = Instant::now();
        let classifier: SharedClassifier<Sentiment> = Arc::new(Hung);
        let result = block_on(classify_bounded(
            classifier,
            Arc::from("staff were rude"),
            Duration::from_millis(20),
        ))
        .unwrap();

        assert_eq!(result.label, Sentiment::Neutral);
        assert_eq!(result.fallback, Some(Fallback::Timeout));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_returns_future_output() {
        assert_eq!(block_on(async { 7 }).unwrap(), 7);
    }
}
