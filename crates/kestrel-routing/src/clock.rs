//! Injectable clock so cache TTLs can be tested deterministically.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Source of monotonic time for cache validity checks.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests.
#[derive(Debug)]
pub struct ManualClock {
    /// Current reported instant.
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Creates a clock anchored at the current instant.
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Advances the reported time by the given duration.
    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new();
        let before = clock.now();
        clock.advance(Duration::from_secs(42));
        assert_eq!(clock.now().duration_since(before), Duration::from_secs(42));
    }
}
