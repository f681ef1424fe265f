//! Request pacing
//!
//! Every wait the crawler makes (rate-limit cooldowns and the jittered pause
//! between tasks) goes through a [`Sleeper`], so the waits can be observed
//! or skipped outside production.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Suspends the crawl for a given duration
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested waits and returns immediately
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every wait requested so far, in order
    pub fn waits(&self) -> Vec<Duration> {
        self.waits
            .lock()
            .map(|waits| waits.clone())
            .unwrap_or_default()
    }

    /// Number of waits of exactly `duration`
    pub fn count_of(&self, duration: Duration) -> usize {
        self.waits().iter().filter(|wait| **wait == duration).count()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut waits) = self.waits.lock() {
            waits.push(duration);
        }
    }
}

/// Bounds of the uniformly random pause between tasks, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    min: f64,
    max: f64,
}

impl DelayRange {
    /// Creates a range; the bounds are swapped if given in reverse
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Draws a delay uniformly from the range
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Duration {
        let secs = self.min + rng.f64() * (self.max - self.min);
        Duration::from_secs_f64(secs.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_stays_in_range() {
        let range = DelayRange::new(1.0, 3.0);
        let mut rng = fastrand::Rng::with_seed(7);

        for _ in 0..1000 {
            let delay = range.sample(&mut rng).as_secs_f64();
            assert!((1.0..=3.0).contains(&delay), "delay {} out of range", delay);
        }
    }

    #[test]
    fn test_degenerate_range() {
        let range = DelayRange::new(0.5, 0.5);
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(range.sample(&mut rng), Duration::from_millis(500));
    }

    #[test]
    fn test_reversed_bounds() {
        let range = DelayRange::new(3.0, 1.0);
        assert_eq!(range.min(), 1.0);
        assert_eq!(range.max(), 3.0);
    }

    #[tokio::test]
    async fn test_recording_sleeper() {
        let sleeper = RecordingSleeper::new();
        sleeper.sleep(Duration::from_secs(60)).await;
        sleeper.sleep(Duration::from_secs(2)).await;
        sleeper.sleep(Duration::from_secs(60)).await;

        assert_eq!(sleeper.waits().len(), 3);
        assert_eq!(sleeper.count_of(Duration::from_secs(60)), 2);
    }

    #[tokio::test]
    async fn test_tokio_sleeper_waits() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
