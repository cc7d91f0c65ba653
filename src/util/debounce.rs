//! Timer-reset debouncing for rapid input, e.g. search keystrokes.
//!
//! Cooperative and single-threaded: callers schedule values and poll with
//! the current time from their event loop. A new value replaces the pending
//! one and restarts the timer.

use std::time::{Duration, Instant};

/// Coalesces a burst of values into the last one after a quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule a value, replacing and re-timing any pending one.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((now, value));
    }

    /// Drop the pending value without firing.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let fired = match &self.pending {
            Some((scheduled, _)) => now.duration_since(*scheduled) >= self.delay,
            None => false,
        };
        if fired {
            self.pending.take().map(|(_, value)| value)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn fires_after_the_quiet_period() {
        let mut debouncer = Debouncer::new(DELAY);
        let start = Instant::now();
        debouncer.schedule("query", start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(100)), None);
        assert_eq!(debouncer.poll(start + DELAY), Some("query"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn new_value_resets_the_timer() {
        let mut debouncer = Debouncer::new(DELAY);
        let start = Instant::now();
        debouncer.schedule("first", start);
        debouncer.schedule("second", start + Duration::from_millis(200));
        // The original deadline passes without firing.
        assert_eq!(debouncer.poll(start + DELAY), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(500)),
            Some("second")
        );
    }

    #[test]
    fn cancel_discards_the_pending_value() {
        let mut debouncer = Debouncer::new(DELAY);
        let start = Instant::now();
        debouncer.schedule("doomed", start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + DELAY), None);
    }
}
