//! Client-side pacing between dispatches.
//!
//! The base pause applies between every pair of candidates. Each consecutive
//! dispatch failure multiplies it by the backoff factor, capped at the
//! configured maximum; any other outcome drops it back to the base.

use std::time::Duration;

use crate::config::UploadSettings;
use crate::upload::cancel::CancelHandle;

/// How a candidate ended, as far as pacing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceOutcome {
    Created,
    /// Rejected locally by validation; the API was not called.
    Skipped,
    DispatchFailed,
}

#[derive(Debug, Clone)]
pub struct Pacer {
    base: Duration,
    multiplier: f64,
    max: Duration,
    consecutive_failures: u32,
}

impl Pacer {
    pub fn new(settings: &UploadSettings) -> Self {
        Self {
            base: settings.inter_item_delay,
            multiplier: settings.backoff_multiplier.max(1.0),
            max: settings.max_delay.max(settings.inter_item_delay),
            consecutive_failures: 0,
        }
    }

    pub fn record(&mut self, outcome: PaceOutcome) {
        match outcome {
            PaceOutcome::DispatchFailed => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1)
            }
            PaceOutcome::Created | PaceOutcome::Skipped => self.consecutive_failures = 0,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Pause to apply before the next candidate.
    pub fn next_delay(&self) -> Duration {
        if self.consecutive_failures == 0 {
            return self.base;
        }
        let exponent = i32::try_from(self.consecutive_failures).unwrap_or(i32::MAX);
        let secs = self.base.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Sleeps for [`Pacer::next_delay`]. Returns `false` if the run was
    /// cancelled before the pause elapsed.
    pub async fn wait(&self, cancel: &CancelHandle) -> bool {
        let delay = self.next_delay();
        if delay.is_zero() {
            return !cancel.is_cancelled();
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => !cancel.is_cancelled(),
            _ = cancel.cancelled() => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base_ms: u64, multiplier: f64, max_ms: u64) -> UploadSettings {
        UploadSettings {
            inter_item_delay: Duration::from_millis(base_ms),
            backoff_multiplier: multiplier,
            max_delay: Duration::from_millis(max_ms),
            ..UploadSettings::immediate()
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let mut pacer = Pacer::new(&settings(500, 2.0, 3000));
        assert_eq!(pacer.next_delay(), Duration::from_millis(500));

        pacer.record(PaceOutcome::DispatchFailed);
        assert_eq!(pacer.next_delay(), Duration::from_millis(1000));
        pacer.record(PaceOutcome::DispatchFailed);
        assert_eq!(pacer.next_delay(), Duration::from_millis(2000));
        pacer.record(PaceOutcome::DispatchFailed);
        assert_eq!(pacer.next_delay(), Duration::from_millis(3000));
        for _ in 0..100 {
            pacer.record(PaceOutcome::DispatchFailed);
        }
        assert_eq!(pacer.next_delay(), Duration::from_millis(3000));
    }

    #[test]
    fn test_success_and_skip_reset_backoff() {
        let mut pacer = Pacer::new(&settings(100, 3.0, 10_000));
        pacer.record(PaceOutcome::DispatchFailed);
        pacer.record(PaceOutcome::Skipped);
        assert_eq!(pacer.consecutive_failures(), 0);
        assert_eq!(pacer.next_delay(), Duration::from_millis(100));

        pacer.record(PaceOutcome::DispatchFailed);
        pacer.record(PaceOutcome::Created);
        assert_eq!(pacer.next_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_fixed_interval_when_multiplier_is_one() {
        let mut pacer = Pacer::new(&settings(250, 1.0, 250));
        pacer.record(PaceOutcome::DispatchFailed);
        pacer.record(PaceOutcome::DispatchFailed);
        assert_eq!(pacer.next_delay(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_sleeps_full_delay() {
        let pacer = Pacer::new(&settings(1000, 2.0, 5000));
        let cancel = CancelHandle::new();
        let started = tokio::time::Instant::now();
        assert!(pacer.wait(&cancel).await);
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_interrupted_by_cancel() {
        let pacer = Pacer::new(&settings(60_000, 1.0, 60_000));
        let cancel = CancelHandle::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let started = tokio::time::Instant::now();
        assert!(!pacer.wait(&cancel).await);
        assert!(started.elapsed() < Duration::from_secs(60));
    }
}
