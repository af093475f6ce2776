use tokio::time::{sleep, Duration};
use tracing::warn;

pub struct RetryConfig {
    max_retries: u32,
    initial_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self { max_retries: max_retries.max(1), initial_delay }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before attempt `attempt + 1`, doubling from `initial_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Run `operation` until it succeeds or `max_retries` attempts have failed.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, operation: F) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    with_retry_if(config, operation, |_| true).await
}

/// Like [`with_retry`], but gives up immediately on errors `should_retry`
/// rejects.
pub async fn with_retry_if<F, Fut, T, E, P>(config: &RetryConfig, operation: F, should_retry: P) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempts = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if attempts >= config.max_retries || !should_retry(&e) {
                    return Err(e);
                }
                let delay = config.delay_for(attempts);
                warn!(attempt = attempts, delay_ms = delay.as_millis() as u64, error = %e, "retrying");
                sleep(delay).await;
            }
        }
    }
}
