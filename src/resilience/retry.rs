//! Retry with exponential backoff and jitter.

use crate::{Error, ErrorKind, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub exponential_base: f64,
    pub jitter: bool,
    /// Error kinds retried in addition to API errors the adapter flags as
    /// retryable. Authentication failures are never retried regardless of
    /// this set.
    pub retryable_kinds: Vec<ErrorKind>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            exponential_base: 2.0,
            jitter: true,
            retryable_kinds: vec![ErrorKind::RateLimited, ErrorKind::Timeout],
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_exponential_base(mut self, exponential_base: f64) -> Self {
        self.exponential_base = exponential_base;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_retryable_kinds(mut self, kinds: Vec<ErrorKind>) -> Self {
        self.retryable_kinds = kinds;
        self
    }

    /// Backoff for a 0-indexed attempt: `base * exponential_base^attempt`,
    /// capped at `max_delay`, plus uniform jitter in `[0, 0.25 * delay]`
    /// when enabled.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exp = self.exponential_base.powi(attempt as i32);
        let mut delay = (self.base_delay.as_secs_f64() * exp).min(self.max_delay.as_secs_f64());
        if self.jitter {
            delay += delay * 0.25 * rand::thread_rng().gen_range(0.0..1.0);
        }
        Duration::from_secs_f64(delay)
    }
}

/// Pure classification: retryable iff the error kind is configured or the
/// adapter flagged an API error retryable. Authentication short-circuits to
/// fatal before any configured set is consulted.
pub fn is_retryable(error: &Error, config: &RetryConfig) -> bool {
    if matches!(error, Error::Authentication { .. }) {
        return false;
    }
    if config.retryable_kinds.contains(&error.kind()) {
        return true;
    }
    if let Error::Api { retryable, .. } = error {
        return *retryable;
    }
    false
}

/// Snapshot handed to the retry hook before each backoff sleep.
#[derive(Debug, Clone)]
pub struct RetryNotice {
    /// 1-based attempt number that just failed.
    pub attempt: u32,
    pub max_attempts: u32,
    pub delay: Duration,
    pub error_type: &'static str,
}

/// Stateless retry driver; the attempt counter resets on every `run`.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Invoke `op`, retrying transient failures with backoff. Non-retryable
    /// errors propagate unchanged on the first attempt; exhaustion wraps the
    /// last error into [`Error::RetryExhausted`].
    pub async fn run<T, F, Fut>(&self, provider: &str, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run_with_hook(provider, op, |_| std::future::ready(()))
            .await
    }

    /// Like [`run`](Self::run), calling `on_retry` before each backoff sleep
    /// (for retry events and logging).
    pub async fn run_with_hook<T, F, Fut, H, HFut>(
        &self,
        provider: &str,
        mut op: F,
        mut on_retry: H,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        H: FnMut(RetryNotice) -> HFut,
        HFut: Future<Output = ()>,
    {
        let max_attempts = self.config.max_retries + 1;
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !is_retryable(&error, &self.config) {
                        return Err(error);
                    }
                    if attempt >= self.config.max_retries {
                        return Err(Error::RetryExhausted {
                            provider: provider.to_string(),
                            attempts: max_attempts,
                            last_error: Box::new(error),
                        });
                    }

                    let mut delay = self.config.calculate_delay(attempt);
                    // A server-supplied hint is a floor, not a replacement.
                    if let Some(hint) = error.retry_after() {
                        delay = delay.max(Duration::from_secs_f64(hint));
                    }

                    warn!(
                        provider = provider,
                        attempt = attempt + 1,
                        max_attempts = max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error_type = error.error_type(),
                        "transient failure, retrying"
                    );
                    on_retry(RetryNotice {
                        attempt: attempt + 1,
                        max_attempts,
                        delay,
                        error_type: error.error_type(),
                    })
                    .await;

                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
