use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::warn;

/// How many times to retry, and how long to wait before the first retry.
///
/// Delays grow along the Fibonacci sequence: `d, d, 2d, 3d, 5d, ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_retries: usize,
}

impl RetryPolicy {
    pub const fn new(initial_delay: Duration, max_retries: usize) -> Self {
        Self {
            initial_delay,
            max_retries,
        }
    }

    /// The delay before each retry, `max_retries` of them.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let mut fib = (self.initial_delay, self.initial_delay);
        std::iter::repeat_with(move || {
            let delay = fib.0;
            fib = (fib.1, fib.0 + fib.1);
            delay
        })
        .take(self.max_retries)
    }
}

pub async fn retry_with_backoff<T, E, Fut, F>(operation: F, policy: RetryPolicy) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
{
    retry_with_backoff_if(operation, policy, |_| true).await
}

/// Like [`retry_with_backoff`], but only errors accepted by `should_retry`
/// are retried. Any other error is returned at once.
pub async fn retry_with_backoff_if<T, E, Fut, F, P>(
    operation: F,
    policy: RetryPolicy,
    should_retry: P,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Debug,
{
    let mut delays = policy.delays();
    let mut retries = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if !should_retry(&e) => return Err(e),
            Err(e) => match delays.next() {
                Some(delay) => {
                    retries += 1;
                    warn!(
                        "Operation failed: {:?}. Retrying in {:?} (attempt {}/{})",
                        e, delay, retries, policy.max_retries
                    );
                    sleep(delay).await;
                }
                None => return Err(e),
            },
        }
    }
}
