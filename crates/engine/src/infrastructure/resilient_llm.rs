//! Retry wrapper around the reasoning provider.
//!
//! Absorbs transient provider failures with exponential backoff before the
//! reasoning layer falls back to canned decisions. The budget is small:
//! decision queries feed the simulation loop's fixed cadence, so the whole
//! retry sequence has to fit inside a couple of ticks.

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};

/// Retry budget and backoff shape.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the initial attempt (0 = single attempt).
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Ceiling on the backoff growth, in milliseconds.
    pub max_delay_ms: u64,
    /// Fraction of the delay randomized away to spread concurrent retries.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 200,
            max_delay_ms: 1500,
            jitter_factor: 0.2,
        }
    }
}

/// Adds retry behavior to any [`LlmPort`] implementation.
pub struct ResilientLlmClient {
    inner: Arc<dyn LlmPort>,
    config: RetryConfig,
}

impl ResilientLlmClient {
    pub fn new(inner: Arc<dyn LlmPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl LlmPort for ResilientLlmClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut attempt = 0;
        loop {
            match self.inner.generate(request.clone()).await {
                Ok(response) => {
                    if attempt > 0 {
                        tracing::info!(attempt = attempt + 1, "LLM request succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(e) if !e.is_transient() => {
                    tracing::error!(error = %e, "LLM request failed with non-retryable error");
                    return Err(e);
                }
                Err(e) if attempt >= self.config.max_retries => {
                    tracing::error!(
                        attempts = attempt + 1,
                        error = %e,
                        "LLM request failed after all retry attempts"
                    );
                    return Err(e);
                }
                Err(e) => {
                    attempt += 1;
                    let delay = backoff_delay(&self.config, attempt);
                    tracing::warn!(
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "LLM request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Delay before retry `attempt` (1-based): exponential growth from the base,
/// capped, then jittered by ±`jitter_factor`.
fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let doubled = config
        .base_delay_ms
        .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = doubled.min(config.max_delay_ms);

    let spread = (capped as f64 * config.jitter_factor) as i64;
    let jittered = if spread > 0 {
        let offset = rand::thread_rng().gen_range(-spread..=spread);
        (capped as i64 + offset).max(0) as u64
    } else {
        capped
    };
    Duration::from_millis(jittered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then answers; counts every call.
    struct FlakyLlm {
        failures: u32,
        error: LlmError,
        calls: AtomicU32,
    }

    impl FlakyLlm {
        fn new(failures: u32, error: LlmError) -> Self {
            Self {
                failures,
                error,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmPort for FlakyLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(self.error.clone())
            } else {
                Ok(LlmResponse {
                    content: "on the move".to_string(),
                })
            }
        }
    }

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay_ms: 1,
            max_delay_ms: 10,
            jitter_factor: 0.0,
        }
    }

    #[tokio::test]
    async fn healthy_provider_needs_one_attempt() {
        let flaky = Arc::new(FlakyLlm::new(0, LlmError::RequestFailed("unused".into())));
        let client = ResilientLlmClient::new(flaky.clone(), RetryConfig::default());

        let response = client
            .generate(LlmRequest::new(vec![]))
            .await
            .expect("response");
        assert_eq!(response.content, "on the move");
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_away() {
        let flaky = Arc::new(FlakyLlm::new(
            2,
            LlmError::RequestFailed("transient".into()),
        ));
        let client = ResilientLlmClient::new(flaky.clone(), fast_config(3));

        assert!(client.generate(LlmRequest::new(vec![])).await.is_ok());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn budget_exhaustion_surfaces_the_last_error() {
        let flaky = Arc::new(FlakyLlm::new(
            10,
            LlmError::RequestFailed("persistent".into()),
        ));
        let client = ResilientLlmClient::new(flaky.clone(), fast_config(2));

        assert!(client.generate(LlmRequest::new(vec![])).await.is_err());
        // Initial attempt plus two retries.
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn auth_errors_are_not_retried() {
        let flaky = Arc::new(FlakyLlm::new(
            10,
            LlmError::RequestFailed("401 Unauthorized".into()),
        ));
        let client = ResilientLlmClient::new(flaky.clone(), fast_config(3));

        assert!(client.generate(LlmRequest::new(vec![])).await.is_err());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let config = RetryConfig {
            max_retries: 5,
            base_delay_ms: 200,
            max_delay_ms: 1500,
            jitter_factor: 0.0,
        };

        assert_eq!(backoff_delay(&config, 1), Duration::from_millis(200));
        assert_eq!(backoff_delay(&config, 2), Duration::from_millis(400));
        assert_eq!(backoff_delay(&config, 3), Duration::from_millis(800));
        // 200 * 2^3 = 1600, capped at 1500.
        assert_eq!(backoff_delay(&config, 4), Duration::from_millis(1500));
    }
}
