//! Deadline-based debouncing for rapid selection changes.

use std::time::{Duration, Instant};

/// Default quiet period before a pending change is applied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Collapses a burst of triggers into a single firing after a quiet period.
///
/// The coordinator's tick loop calls [`Debouncer::fire_due`] once per tick;
/// every [`Debouncer::arm`] in between pushes the deadline out again, so only
/// the last trigger of a burst takes effect.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start or restart the quiet period from `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop any pending deadline without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once per armed period, when the deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_the_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();
        debouncer.arm(start);
        assert!(!debouncer.fire_due(start + Duration::from_millis(100)));
        assert!(debouncer.fire_due(start + Duration::from_millis(300)));
        assert!(!debouncer.fire_due(start + Duration::from_millis(400)));
        assert!(!debouncer.is_armed());
    }

    #[test]
    fn rearming_pushes_the_deadline_out() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();
        debouncer.arm(start);
        debouncer.arm(start + Duration::from_millis(200));
        assert!(!debouncer.fire_due(start + Duration::from_millis(400)));
        assert!(debouncer.fire_due(start + Duration::from_millis(500)));
    }

    #[test]
    fn cancel_discards_the_pending_deadline() {
        let mut debouncer = Debouncer::default();
        let start = Instant::now();
        debouncer.arm(start);
        debouncer.cancel();
        assert!(!debouncer.fire_due(start + Duration::from_secs(10)));
    }
}
