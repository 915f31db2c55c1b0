//! Spacing for mutating calls.
//!
//! Development stores accept about five `orderCreate` calls per minute, so
//! batch generators pace their mutations instead of retrying on 429.

use std::time::Duration;

use tokio::time::Instant;

/// Enforces a minimum interval between successive calls to [`Pacer::ready`].
///
/// The first call never waits.
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// A pacer that never sleeps.
    #[must_use]
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO)
    }

    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Sleeps until `min_interval` has passed since the previous call, then
    /// marks the current instant.
    pub async fn ready(&mut self) {
        if let Some(last) = self.last {
            let wait = self.min_interval.saturating_sub(last.elapsed());
            if !wait.is_zero() {
                tracing::debug!(
                    wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                    "pacing mutation"
                );
                // `sleep` clamps deadlines past the end of the clock.
                tokio::time::sleep(wait).await;
            }
        }
        self.last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_call_does_not_wait() {
        let mut pacer = Pacer::new(Duration::from_secs(60));
        let start = std::time::Instant::now();
        pacer.ready().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn second_call_waits_for_interval() {
        let mut pacer = Pacer::new(Duration::from_millis(80));
        pacer.ready().await;
        let start = std::time::Instant::now();
        pacer.ready().await;
        assert!(start.elapsed() >= Duration::from_millis(70));
    }

    #[tokio::test]
    async fn unthrottled_never_waits() {
        let mut pacer = Pacer::unthrottled();
        let start = std::time::Instant::now();
        for _ in 0..5 {
            pacer.ready().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(pacer.min_interval(), Duration::ZERO);
    }

    #[tokio::test]
    async fn huge_interval_waits_instead_of_overflowing() {
        let mut pacer = Pacer::new(Duration::from_secs(u64::MAX));
        pacer.ready().await;
        let second = tokio::time::timeout(Duration::from_millis(50), pacer.ready()).await;
        assert!(second.is_err(), "second call should still be sleeping");
    }
}
