//! Per-user cooldown windows for automatic responses.
//!
//! One tracker per response kind (intent replies, AI replies), each with
//! its own window. Time is always passed in, never read here, so tests
//! can drive the clock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct CooldownTracker {
    window: Duration,
    last_fired: HashMap<i64, Instant>,
}

impl CooldownTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: HashMap::new(),
        }
    }

    /// True iff this user has no live cooldown entry.
    ///
    /// An entry older than the window is removed here, so the map only
    /// ever holds users inside an active window.
    pub fn should_fire(&mut self, user_id: i64, now: Instant) -> bool {
        let expired = match self.last_fired.get(&user_id) {
            None => return true,
            Some(&last) => now.duration_since(last) >= self.window,
        };
        if expired {
            self.last_fired.remove(&user_id);
        }
        expired
    }

    /// Record a firing for this user. Call once per actual response,
    /// immediately before dispatch.
    pub fn record_fired(&mut self, user_id: i64, now: Instant) {
        self.last_fired.insert(user_id, now);
    }

    #[cfg(test)]
    fn tracked_users(&self) -> usize {
        self.last_fired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn test_first_event_always_fires() {
        let mut cd = CooldownTracker::new(WINDOW);
        let t0 = Instant::now();
        assert!(cd.should_fire(1, t0));
    }

    #[test]
    fn test_within_window_blocks() {
        let mut cd = CooldownTracker::new(WINDOW);
        let t0 = Instant::now();
        cd.record_fired(1, t0);
        assert!(!cd.should_fire(1, t0 + Duration::from_secs(30)));
    }

    #[test]
    fn test_after_window_fires_again() {
        let mut cd = CooldownTracker::new(WINDOW);
        let t0 = Instant::now();
        cd.record_fired(1, t0);
        assert!(cd.should_fire(1, t0 + Duration::from_secs(61)));
    }

    #[test]
    fn test_exactly_at_window_fires() {
        let mut cd = CooldownTracker::new(WINDOW);
        let t0 = Instant::now();
        cd.record_fired(1, t0);
        assert!(cd.should_fire(1, t0 + Duration::from_secs(60)));
    }

    #[test]
    fn test_users_are_independent() {
        let mut cd = CooldownTracker::new(WINDOW);
        let t0 = Instant::now();
        cd.record_fired(1, t0);
        assert!(cd.should_fire(2, t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_expired_entries_are_evicted_on_read() {
        let mut cd = CooldownTracker::new(WINDOW);
        let t0 = Instant::now();
        cd.record_fired(1, t0);
        cd.record_fired(2, t0);
        assert_eq!(cd.tracked_users(), 2);

        assert!(cd.should_fire(1, t0 + Duration::from_secs(120)));
        assert_eq!(cd.tracked_users(), 1);
    }

    #[test]
    fn test_record_overwrites() {
        let mut cd = CooldownTracker::new(WINDOW);
        let t0 = Instant::now();
        cd.record_fired(1, t0);
        cd.record_fired(1, t0 + Duration::from_secs(50));
        // 70s after the first firing, but only 20s after the second
        assert!(!cd.should_fire(1, t0 + Duration::from_secs(70)));
    }
}
