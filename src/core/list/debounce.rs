//! Quiet-period debouncing for text input.
//!
//! Each `push` replaces the pending value and restarts the quiet period, so a
//! burst of keystrokes yields a single emission once input pauses. Time is
//! passed in by the caller.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Schedule `value`, cancelling whatever was pending.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.quiet));
    }

    /// Take the pending value if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = self.pending.as_ref().is_some_and(|(_, due)| *due <= now);
        if ready {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_once_after_quiet_period() {
        let start = Instant::now();
        let mut debounce = Debouncer::from_millis(300);

        debounce.push("l", start);
        debounce.push("li", start + Duration::from_millis(100));
        debounce.push("lim", start + Duration::from_millis(200));

        assert_eq!(debounce.poll(start + Duration::from_millis(450)), None);
        assert_eq!(debounce.poll(start + Duration::from_millis(500)), Some("lim"));
        assert_eq!(debounce.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn keystroke_resets_deadline() {
        let start = Instant::now();
        let mut debounce = Debouncer::from_millis(300);
        debounce.push(1, start);
        assert_eq!(debounce.deadline(), Some(start + Duration::from_millis(300)));
        debounce.push(2, start + Duration::from_millis(250));
        assert_eq!(debounce.deadline(), Some(start + Duration::from_millis(550)));
    }

    #[test]
    fn cancel_drops_pending_value() {
        let start = Instant::now();
        let mut debounce = Debouncer::from_millis(300);
        debounce.push("gin", start);
        assert_eq!(debounce.cancel(), Some("gin"));
        assert!(!debounce.is_pending());
        assert_eq!(debounce.poll(start + Duration::from_secs(1)), None);
    }
}
