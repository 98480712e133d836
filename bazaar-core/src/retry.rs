use std::future::Future;
use std::time::Duration;

/// Bounded retry with exponential backoff, expressed as a value so callers
/// can inject different envelopes per environment.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given 1-based attempt number fails.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        self.base_delay.mul_f64(factor)
    }
}

/// Run `op` until it succeeds, the error is classified non-retryable, or the
/// policy's attempt budget is exhausted. `on_retry` fires before each backoff
/// sleep with the 1-based attempt number that just failed.
pub async fn run_with_retry<T, E, Op, Fut, R, H>(
    policy: &RetryPolicy,
    mut op: Op,
    is_retryable: R,
    mut on_retry: H,
) -> Result<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    H: FnMut(u32, &E),
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_attempts || !is_retryable(&err) {
                    return Err(err);
                }
                on_retry(attempt, &err);
                tokio::time::sleep(policy.delay_after(attempt)).await;
                attempt += 1;
            }
        }
    }
}
