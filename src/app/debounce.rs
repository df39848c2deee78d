// LogDeck - app/debounce.rs
//
// Search input debouncing. Keystrokes update the pending text immediately;
// the committed search (the one the view filters with) changes only after
// the input has been at rest for the configured delay. Time is passed in by
// the caller so the owner's event loop decides when to poll.

use std::time::{Duration, Instant};

/// Holds the latest typed text until it has been stable long enough.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
    committed: String,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            committed: String::new(),
        }
    }

    /// Record a keystroke. Restarts the quiet-period timer.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        if self.pending.is_none() && text == self.committed {
            return;
        }
        self.pending = Some((text, now));
    }

    /// Commit the pending text if it has been at rest for the delay.
    /// Returns the newly committed text when it differs from the previous one.
    pub fn poll(&mut self, now: Instant) -> Option<&str> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= self.delay);
        if !ready {
            return None;
        }
        self.commit()
    }

    /// Commit the pending text immediately (e.g. Enter pressed).
    pub fn flush(&mut self) -> Option<&str> {
        self.commit()
    }

    fn commit(&mut self) -> Option<&str> {
        let (text, _) = self.pending.take()?;
        if text == self.committed {
            return None;
        }
        tracing::debug!(search = %text, "Search committed");
        self.committed = text;
        Some(&self.committed)
    }

    /// The text the view is currently filtering with.
    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Latest typed text, committed or not.
    pub fn current_input(&self) -> &str {
        self.pending
            .as_ref()
            .map_or(self.committed.as_str(), |(t, _)| t.as_str())
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop pending and committed text.
    pub fn clear(&mut self) {
        self.pending = None;
        self.committed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_commits_only_after_quiet_period() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::new(DELAY);
        d.input("ti", t0);
        assert!(d.poll(t0 + Duration::from_millis(100)).is_none());
        d.input("timeout", t0 + Duration::from_millis(200));
        // 300ms after the first keystroke but only 100ms after the last.
        assert!(d.poll(t0 + Duration::from_millis(300)).is_none());
        assert_eq!(d.committed(), "");
        assert_eq!(d.current_input(), "timeout");

        assert_eq!(d.poll(t0 + Duration::from_millis(500)), Some("timeout"));
        assert_eq!(d.committed(), "timeout");
        assert!(!d.is_pending());
    }

    #[test]
    fn test_retyping_committed_text_is_not_a_change() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::new(DELAY);
        d.input("abc", t0);
        d.flush();
        d.input("abcd", t0);
        d.input("abc", t0 + Duration::from_millis(50));
        assert!(d.poll(t0 + Duration::from_secs(1)).is_none());
        assert_eq!(d.committed(), "abc");
    }

    #[test]
    fn test_flush_commits_immediately() {
        let mut d = SearchDebouncer::new(DELAY);
        d.input("err", Instant::now());
        assert_eq!(d.flush(), Some("err"));
        assert!(d.flush().is_none());
    }

    #[test]
    fn test_zero_delay_commits_on_first_poll() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::new(Duration::ZERO);
        d.input("x", t0);
        assert_eq!(d.poll(t0), Some("x"));
    }
}
