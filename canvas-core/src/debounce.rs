//! Poll-driven coalescing timers.
//!
//! A [`Debouncer`] holds at most one pending request. Every new request
//! replaces the payload and pushes the deadline out by the full delay, so a
//! burst of requests fires exactly once, after the burst goes quiet. The
//! host drives it by calling [`Debouncer::poll`] from its event loop.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock shared between a test and the code under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    /// Start at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Single-slot trailing-edge debouncer.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Quiet period before a request fires.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, replacing any pending request and resetting the timer.
    pub fn request(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            deadline: now + self.delay,
        });
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if now >= p.deadline => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Take the pending value regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Drop the pending request. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Whether a request is waiting to fire.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending request will fire.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(100);

    #[test]
    fn test_fires_once_after_quiet_period() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.request(1, clock.now());
        clock.advance(Duration::from_millis(99));
        assert_eq!(debouncer.poll(clock.now()), None);

        clock.advance(Duration::from_millis(1));
        assert_eq!(debouncer.poll(clock.now()), Some(1));
        assert_eq!(debouncer.poll(clock.now()), None);
    }

    #[test]
    fn test_burst_coalesces_to_latest_value() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(DELAY);
        let mut fired = Vec::new();

        for i in 0..20 {
            debouncer.request(i, clock.now());
            clock.advance(Duration::from_millis(16));
            if let Some(v) = debouncer.poll(clock.now()) {
                fired.push(v);
            }
        }
        assert!(fired.is_empty());

        clock.advance(DELAY);
        assert_eq!(debouncer.poll(clock.now()), Some(19));
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.request("x", clock.now());
        assert!(debouncer.cancel());
        clock.advance(DELAY * 2);
        assert_eq!(debouncer.poll(clock.now()), None);
        assert!(!debouncer.cancel());
    }

    #[test]
    fn test_flush_ignores_deadline() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.request(5, clock.now());
        assert_eq!(debouncer.deadline(), Some(clock.now() + DELAY));
        assert_eq!(debouncer.flush(), Some(5));
        assert!(!debouncer.is_pending());
    }
}
