//! Translation capability seam.
//!
//! The pipeline is generic over [`Translate`] so the CLI can run with no
//! translator at all while tests plug in fakes. [`RetryTranslate`] wraps any
//! translator with exponential backoff for transient upstream failures.

use crate::error::{PipelineError, Result};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};

/// A capability that can translate article titles and body HTML.
///
/// Implementations must preserve the HTML structure of the body; only text
/// nodes are expected to change.
pub trait Translate: Send + Sync {
    async fn translate_title(&self, title: &str) -> Result<String>;
    async fn translate_body(&self, body_html: &str) -> Result<String>;
}

/// Translator that always fails. Used when the pipeline is configured
/// without a translation backend; callers treat the failure as non-fatal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTranslator;

impl Translate for NullTranslator {
    async fn translate_title(&self, _title: &str) -> Result<String> {
        Err(PipelineError::TranslationFailed(
            "no translation backend configured".to_string(),
        ))
    }

    async fn translate_body(&self, _body_html: &str) -> Result<String> {
        Err(PipelineError::TranslationFailed(
            "no translation backend configured".to_string(),
        ))
    }
}

/// Retry wrapper with exponential backoff and jitter.
///
/// Delay doubles per attempt from `base_delay`, capped at 30 seconds, with
/// up to 250ms of jitter so concurrent retries don't synchronize.
pub struct RetryTranslate<T> {
    inner: T,
    max_retries: u32,
    base_delay: Duration,
}

impl<T: Translate> RetryTranslate<T> {
    pub fn new(inner: T, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
        }
    }

    async fn with_retries<'a, F, Fut>(&'a self, what: &str, mut call: F) -> Result<String>
    where
        F: FnMut(&'a T) -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let mut attempt = 0u32;
        loop {
            match call(&self.inner).await {
                Ok(out) => return Ok(out),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    let backoff = self
                        .base_delay
                        .saturating_mul(1 << (attempt - 1))
                        .min(Duration::from_secs(30));
                    let jitter = Duration::from_millis(rand::rng().random_range(0..=250));
                    warn!(
                        what,
                        attempt,
                        max = self.max_retries,
                        delay_ms = (backoff + jitter).as_millis() as u64,
                        error = %e,
                        "Translation attempt failed; retrying"
                    );
                    tokio::time::sleep(backoff + jitter).await;
                }
                Err(e) => {
                    debug!(what, attempt, "Translation retries exhausted");
                    return Err(e);
                }
            }
        }
    }
}

impl<T: Translate> Translate for RetryTranslate<T> {
    async fn translate_title(&self, title: &str) -> Result<String> {
        self.with_retries("title", |t| t.translate_title(title)).await
    }

    async fn translate_body(&self, body_html: &str) -> Result<String> {
        self.with_retries("body", |t| t.translate_body(body_html)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then succeeds.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl Translate for Flaky {
        async fn translate_title(&self, title: &str) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(PipelineError::TranslationFailed("transient".to_string()))
            } else {
                Ok(format!("译:{title}"))
            }
        }

        async fn translate_body(&self, body_html: &str) -> Result<String> {
            self.translate_title(body_html).await
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let translator = RetryTranslate::new(Flaky::new(2), 3, Duration::from_millis(1));
        let out = translator.translate_title("Hello").await.unwrap();
        assert_eq!(out, "译:Hello");
        assert_eq!(translator.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max() {
        let translator = RetryTranslate::new(Flaky::new(10), 2, Duration::from_millis(1));
        let err = translator.translate_title("Hello").await.unwrap_err();
        assert!(matches!(err, PipelineError::TranslationFailed(_)));
        // 1 initial + 2 retries.
        assert_eq!(translator.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_null_translator_always_fails() {
        let err = NullTranslator.translate_title("Hello").await.unwrap_err();
        assert!(matches!(err, PipelineError::TranslationFailed(_)));
    }
}
