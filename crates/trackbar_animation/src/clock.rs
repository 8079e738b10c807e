//! Time sources for the scheduler.
//!
//! [`SystemClock`] follows the wall clock for real event loops.
//! [`VirtualClock`] only moves when told to, which makes debounce and tween
//! timing deterministic in tests and headless runs.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// A monotonic time source, measured from the clock's own epoch.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Real time, measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// A clock that is advanced explicitly.
#[derive(Debug, Default)]
pub struct VirtualClock {
    position: Cell<Duration>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward by `delta`
    pub fn advance(&self, delta: Duration) {
        self.position.set(self.position.get() + delta);
    }

    /// Jump to an absolute position. Moving backwards is ignored.
    pub fn set(&self, position: Duration) {
        if position > self.position.get() {
            self.position.set(position);
        }
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        self.position.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_advance() {
        let clock = VirtualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);

        clock.advance(Duration::from_millis(16));
        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.now(), Duration::from_millis(32));
    }

    #[test]
    fn test_virtual_clock_never_goes_back() {
        let clock = VirtualClock::new();
        clock.set(Duration::from_millis(100));
        clock.set(Duration::from_millis(50));
        assert_eq!(clock.now(), Duration::from_millis(100));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
