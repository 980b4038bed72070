//! Exponential backoff for remote embedding calls.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::SemanticError;

/// Retry policy for the HTTP provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    #[serde(with = "millis")]
    pub base_delay: Duration,
    /// Upper bound for any single delay, in milliseconds.
    #[serde(with = "millis")]
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Spread each delay by up to ±25%.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before retry number `attempt` (1-based). Attempt 0 never waits.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponential = self.base_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32 - 1);
        let delay_ms = exponential.min(self.max_delay.as_millis() as f64) as u64;

        if self.jitter {
            let spread = delay_ms / 4;
            if spread > 0 {
                let offset = fastrand::u64(0..=spread * 2);
                return Duration::from_millis(delay_ms - spread + offset);
            }
        }
        Duration::from_millis(delay_ms)
    }
}

/// Run `operation` until it succeeds, fails permanently, or retries run out.
///
/// The closure receives the zero-based attempt number. Only errors for which
/// [`SemanticError::is_retryable`] holds are retried; the last error is
/// returned unchanged.
pub async fn retry_async<T, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T, SemanticError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, SemanticError>>,
{
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < config.max_retries => {
                attempt += 1;
                let delay = config.delay_for(attempt);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying embedding request");
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(err) => return Err(err),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig::default()
            .with_base_delay(Duration::from_millis(1))
            .with_jitter(false)
    }

    #[test]
    fn delays_grow_exponentially_and_cap() {
        let cfg = RetryConfig::default()
            .with_base_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(300))
            .with_jitter(false);
        assert_eq!(cfg.delay_for(0), Duration::ZERO);
        assert_eq!(cfg.delay_for(1), Duration::from_millis(100));
        assert_eq!(cfg.delay_for(2), Duration::from_millis(200));
        assert_eq!(cfg.delay_for(3), Duration::from_millis(300));
    }

    #[test]
    fn jitter_stays_within_a_quarter() {
        let cfg = RetryConfig::default().with_base_delay(Duration::from_millis(400));
        for _ in 0..50 {
            let d = cfg.delay_for(1).as_millis();
            assert!((300..=500).contains(&d), "{d}");
        }
    }

    #[test]
    fn millis_round_trip_through_json() {
        let json = serde_json::json!({"max_retries": 1, "base_delay": 250});
        let cfg: RetryConfig = serde_json::from_value(json).unwrap();
        assert_eq!(cfg.base_delay, Duration::from_millis(250));
        assert_eq!(cfg.max_delay, Duration::from_secs(5));
        assert_eq!(serde_json::to_value(cfg).unwrap()["base_delay"], 250);
    }

    #[tokio::test]
    async fn transient_errors_are_retried() {
        let calls = AtomicU32::new(0);
        let out = retry_async(&fast(), |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(SemanticError::request("connection refused"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(out, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_fail_immediately() {
        let calls = AtomicU32::new(0);
        let out: Result<(), _> = retry_async(&fast(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(SemanticError::Status {
                    status: 401,
                    body: "bad key".into(),
                })
            }
        })
        .await;
        assert!(matches!(out, Err(SemanticError::Status { status: 401, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let out: Result<(), _> = retry_async(&fast().with_max_retries(2), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(SemanticError::request("timeout")) }
        })
        .await;
        assert!(out.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
