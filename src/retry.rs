//! Retry policy for the linkage update loop.
use std::time::Duration;

/// Backoff strategy applied between retry attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    /// Retry immediately.
    None,

    /// Fixed delay between attempts.
    Fixed(Duration),

    /// Exponential delay, `base * factor^attempt`, capped at `max`.
    Exponential {
        /// Delay after the first attempt.
        base: Duration,

        /// Multiplier applied per attempt.
        factor: f64,

        /// Upper bound on the computed delay.
        max: Duration,
    },
}

/// Bounded retry policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts before giving up.
    pub max_attempts: u32,

    /// Delay strategy between attempts.
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // 100 immediate attempts, the bound the consistency-lag loop has
        // always used.
        Self {
            max_attempts: 100,
            backoff: Backoff::None,
        }
    }
}

impl RetryPolicy {
    /// Delay to apply after the given zero-based attempt, `None` when the
    /// next attempt should start immediately.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        match &self.backoff {
            Backoff::None => None,
            Backoff::Fixed(delay) => Some(*delay),
            Backoff::Exponential { base, factor, max } => {
                let delay = base.as_secs_f64() * factor.powi(attempt as i32);
                Some(Duration::from_secs_f64(delay.min(max.as_secs_f64())))
            }
        }
    }

    /// Sleep for the configured delay after the given attempt, if any.
    pub async fn pause(&self, attempt: u32) {
        if let Some(delay) = self.delay(attempt) {
            tokio::time::sleep(delay).await;
        }
    }
}
