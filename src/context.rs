//! Short-lived per-user topic memory.
//!
//! Remembers the last detected grammar topic for a user so a follow-up
//! AI question can be biased toward it. One topic per user, overwritten
//! on each detection, expired entries evicted on read.

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct ContextMemory {
    timeout: Duration,
    topics: HashMap<i64, (String, Instant)>,
}

impl ContextMemory {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            topics: HashMap::new(),
        }
    }

    /// Store the topic for this user, replacing any prior one.
    pub fn remember(&mut self, user_id: i64, topic: &str, now: Instant) {
        self.topics.insert(user_id, (topic.to_string(), now));
    }

    /// The remembered topic, if it is still fresh. A stale entry is
    /// removed and behaves as never set.
    pub fn recall(&mut self, user_id: i64, now: Instant) -> Option<String> {
        let expired = match self.topics.get(&user_id) {
            None => return None,
            Some((_, set_at)) => now.duration_since(*set_at) > self.timeout,
        };
        if expired {
            self.topics.remove(&user_id);
            return None;
        }
        self.topics.get(&user_id).map(|(topic, _)| topic.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(300);

    #[test]
    fn test_recall_fresh_topic() {
        let mut ctx = ContextMemory::new(TIMEOUT);
        let t0 = Instant::now();
        ctx.remember(1, "gender", t0);
        assert_eq!(
            ctx.recall(1, t0 + Duration::from_secs(299)),
            Some("gender".to_string())
        );
    }

    #[test]
    fn test_recall_at_exact_timeout_still_fresh() {
        let mut ctx = ContextMemory::new(TIMEOUT);
        let t0 = Instant::now();
        ctx.remember(1, "gender", t0);
        assert_eq!(
            ctx.recall(1, t0 + Duration::from_secs(300)),
            Some("gender".to_string())
        );
    }

    #[test]
    fn test_expired_topic_is_evicted() {
        let mut ctx = ContextMemory::new(TIMEOUT);
        let t0 = Instant::now();
        ctx.remember(1, "gender", t0);
        assert_eq!(ctx.recall(1, t0 + Duration::from_secs(301)), None);
        // Entry is gone, a later in-window read still returns nothing
        assert_eq!(ctx.recall(1, t0 + Duration::from_secs(302)), None);
        assert!(ctx.topics.is_empty());
    }

    #[test]
    fn test_remember_overwrites() {
        let mut ctx = ContextMemory::new(TIMEOUT);
        let t0 = Instant::now();
        ctx.remember(1, "gender", t0);
        ctx.remember(1, "plurals", t0 + Duration::from_secs(10));
        assert_eq!(
            ctx.recall(1, t0 + Duration::from_secs(20)),
            Some("plurals".to_string())
        );
    }

    #[test]
    fn test_overwrite_refreshes_expiry() {
        let mut ctx = ContextMemory::new(TIMEOUT);
        let t0 = Instant::now();
        ctx.remember(1, "gender", t0);
        ctx.remember(1, "gender", t0 + Duration::from_secs(250));
        assert_eq!(
            ctx.recall(1, t0 + Duration::from_secs(500)),
            Some("gender".to_string())
        );
    }

    #[test]
    fn test_unknown_user() {
        let mut ctx = ContextMemory::new(TIMEOUT);
        assert_eq!(ctx.recall(42, Instant::now()), None);
    }
}
