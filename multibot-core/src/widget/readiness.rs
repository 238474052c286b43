use std::time::Duration;

use tracing::debug;

use super::WidgetError;

/// Bounded polling for callers that need the frame before sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            attempts: 20,
            interval: Duration::from_millis(500),
        }
    }
}

impl ReadinessPolicy {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// Poll `ready` until it returns true. Returns the attempt it succeeded
    /// on, or [`WidgetError::ReadinessTimeout`] once attempts run out.
    pub async fn wait_until_ready<F>(&self, mut ready: F) -> Result<u32, WidgetError>
    where
        F: FnMut() -> bool,
    {
        for attempt in 1..=self.attempts {
            if ready() {
                debug!(attempt, "Widget ready");
                return Ok(attempt);
            }
            if attempt < self.attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        Err(WidgetError::ReadinessTimeout {
            attempts: self.attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_third_attempt() {
        let mut calls = 0;
        let attempt = ReadinessPolicy::default()
            .wait_until_ready(|| {
                calls += 1;
                calls == 3
            })
            .await
            .unwrap();
        assert_eq!(attempt, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_bounded_attempts() {
        let start = tokio::time::Instant::now();
        let mut calls = 0;
        let err = ReadinessPolicy::default()
            .wait_until_ready(|| {
                calls += 1;
                false
            })
            .await
            .unwrap_err();

        assert_eq!(err, WidgetError::ReadinessTimeout { attempts: 20 });
        assert_eq!(calls, 20);
        assert!(start.elapsed() >= Duration::from_millis(500) * 19);
    }

    #[tokio::test]
    async fn test_zero_attempts_times_out_immediately() {
        let policy = ReadinessPolicy::new(0, Duration::from_millis(1));
        assert!(policy.wait_until_ready(|| true).await.is_err());
    }
}
