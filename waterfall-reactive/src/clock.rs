use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of "now" for the reflow scheduler.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Follows tokio's clock, which can be paused and advanced in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }

    pub fn advance_ms(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_only_moves_when_advanced() {
        let clock = ManualClock::new();
        let start = clock.now();
        assert_eq!(clock.now(), start);

        let shared = clock.clone();
        shared.advance_ms(150);
        assert_eq!(clock.now() - start, Duration::from_millis(150));
    }

    #[test]
    fn test_manual_clock_survives_poisoned_lock() {
        let clock = ManualClock::new();
        let start = clock.now();
        let holder = clock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.now.lock().unwrap();
            panic!("panic while holding the clock");
        })
        .join();

        assert!(clock.now.is_poisoned());
        clock.advance_ms(40);
        assert_eq!(clock.now() - start, Duration::from_millis(40));
    }
}
