use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Max attempts for a structured call before its stage-specific fallback kicks in.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Fixed pause between attempts.
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// One retry policy for every external call site: a fixed attempt budget with
/// a fixed backoff between attempts. Any `Err` counts as a transient fault;
/// callers map "no data" outcomes to `Ok` values so they are never retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Policy with no sleeps, for tests.
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Run `op` until it succeeds or the attempt budget is exhausted,
    /// returning the last error. Sleeps `backoff` between attempts.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        warn!(label, attempt, error = %e, "Retry budget exhausted");
                        return Err(e);
                    }
                    warn!(label, attempt, error = %e, "Call failed, retrying after backoff");
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }
}
