//! Retry with exponential backoff and jitter.
//!
//! Ported from the same pattern used for every upstream-facing call in this
//! lineage: card service lookups, embedding calls, and LLM generations all
//! retry through this helper before surfacing `UpstreamUnavailable` to the
//! caller (spec §4.1, §7).

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

/// Retry configuration. Two attempts total by default (one retry) matches the
/// spec's description of transient upstream failures as short-lived.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

impl RetryConfig {
    fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32 - 1);
        let capped = scaled.min(self.max_delay.as_millis() as f64);
        let jitter_range = capped * self.jitter_factor;
        let jitter = rand::thread_rng().gen_range(0.0..=jitter_range.max(0.0));
        Duration::from_millis((capped - jitter).max(0.0) as u64)
    }
}

/// Run `operation` up to `config.max_attempts` times, retrying only while
/// `should_retry` returns true for the error. Returns the last error once
/// attempts are exhausted.
pub async fn retry<F, Fut, T, E>(
    config: RetryConfig,
    should_retry: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => {
                if attempt >= config.max_attempts || !should_retry(&error) {
                    warn!(attempt, %error, "operation failed, not retrying further");
                    return Err(error);
                }
                let delay = config.delay_for(attempt);
                warn!(attempt, %error, ?delay, "operation failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}
