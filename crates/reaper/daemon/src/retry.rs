//! Retry-on-conflict wrapper
//!
//! Mutating calls against the cluster can fail because the target changed
//! between our read and our write. Those failures are retried with a short,
//! growing, jittered delay; every other failure goes straight back to the
//! caller.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Errors that can report an optimistic-concurrency conflict
pub trait Conflict {
    fn is_conflict(&self) -> bool;
}

/// Bounded backoff policy for conflict retries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Growth factor applied per retry
    #[serde(default = "default_factor")]
    pub factor: f64,

    /// Extra random delay as a fraction of the computed delay (0.0 to 1.0)
    #[serde(default = "default_jitter")]
    pub jitter: f64,

    /// Upper bound for a single delay, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            factor: default_factor(),
            jitter: default_jitter(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_attempts() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    10
}

fn default_factor() -> f64 {
    2.0
}

fn default_jitter() -> f64 {
    0.1
}

fn default_max_delay_ms() -> u64 {
    1_000
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-indexed), jitter included
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        if self.jitter.is_nan() || self.jitter <= 0.0 {
            return base;
        }
        let jitter = self.jitter.min(1.0);
        let extra = base.as_secs_f64() * jitter * rand::thread_rng().gen_range(0.0..1.0);
        base + Duration::from_secs_f64(extra)
    }

    fn base_delay(&self, retry: u32) -> Duration {
        let factor = self.factor.max(1.0);
        let delay_ms = self.initial_delay_ms as f64 * factor.powi(retry as i32);
        let capped = delay_ms.min(self.max_delay_ms as f64);
        Duration::from_nanos((capped * 1_000_000.0).round() as u64)
    }
}

/// Run `op`, retrying while it fails with a conflict.
///
/// Non-conflict errors are returned unretried. Once `policy.attempts` is
/// used up the last conflict error is returned.
pub async fn retry_on_conflict<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Conflict + std::fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_conflict() && attempt < attempts => {
                let delay = policy.backoff_delay(attempt - 1);
                tracing::debug!(
                    attempt = attempt,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Conflict, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
