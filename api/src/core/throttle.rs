//! Process-wide admission gate for `/ask`.
//!
//! One slot at a time: every caller reserves the next free instant under a
//! short lock, then sleeps until that instant outside the lock. Callers are
//! delayed, never rejected, and admissions are spaced by at least
//! `min_interval` regardless of how many requests arrive concurrently.

use std::time::Duration;

use tokio::{sync::Mutex, time::Instant};
use tracing::debug;

#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    /// Earliest instant the next caller may be admitted.
    next_slot: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits for this caller's admission slot and returns the time waited.
    pub async fn acquire(&self) -> Duration {
        let now = Instant::now();

        let slot = {
            let mut next = self.next_slot.lock().await;
            let slot = match *next {
                Some(at) if at > now => at,
                _ => now,
            };
            *next = Some(slot + self.min_interval);
            slot
        };

        let wait = slot.saturating_duration_since(now);
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis(), "throttling /ask");
            tokio::time::sleep_until(slot).await;
        }
        wait
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_call_is_admitted_immediately() {
        let throttle = Throttle::new(Duration::from_secs(1));
        assert_eq!(throttle.acquire().await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn second_call_waits_out_the_interval() {
        let throttle = Throttle::new(Duration::from_secs(1));
        let start = Instant::now();

        throttle.acquire().await;
        tokio::time::advance(Duration::from_millis(300)).await;
        let waited = throttle.acquire().await;

        assert_eq!(waited, Duration::from_millis(700));
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_calls_do_not_wait() {
        let throttle = Throttle::new(Duration::from_secs(1));

        throttle.acquire().await;
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(throttle.acquire().await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_are_spaced() {
        let throttle = Arc::new(Throttle::new(Duration::from_millis(500)));
        let start = Instant::now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let t = throttle.clone();
                tokio::spawn(async move {
                    t.acquire().await;
                    Instant::now()
                })
            })
            .collect();

        let mut admitted = Vec::new();
        for h in handles {
            admitted.push(h.await.unwrap());
        }
        admitted.sort();

        for pair in admitted.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(500));
        }
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_never_waits() {
        let throttle = Throttle::new(Duration::ZERO);
        for _ in 0..3 {
            assert_eq!(throttle.acquire().await, Duration::ZERO);
        }
    }
}
