use std::{collections::HashMap, sync::Mutex};

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Passenger,
    Delivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RetryKey {
    pub kind: RequestKind,
    pub id: i64,
}

/// Process-local, best-effort de-duplication of retry attempts. Not
/// authoritative: request status in the store is the source of truth, and
/// the next tick re-reads PENDING requests regardless of what's in here.
/// This only exists to avoid log/notification storms on repeatedly-failing
/// items.
pub struct RetryQueue {
    cooldown: Duration,
    last_attempt: Mutex<HashMap<RetryKey, DateTime<Utc>>>,
}

impl RetryQueue {
    pub fn new(cooldown_minutes: i64) -> Self {
        Self {
            cooldown: Duration::minutes(cooldown_minutes),
            last_attempt: Mutex::new(HashMap::new()),
        }
    }

    /// Records an attempt at `now` unless the previous one is still within
    /// the cooldown window, in which case this is a no-op. Returns whether
    /// the item was (re-)enqueued.
    pub fn enqueue(&self, key: RetryKey, now: DateTime<Utc>) -> bool {
        let mut guard = self.last_attempt.lock().expect("retry queue poisoned");
        if let Some(last) = guard.get(&key) {
            if now.signed_duration_since(*last) < self.cooldown {
                return false;
            }
        }
        guard.insert(key, now);
        true
    }

    pub fn len(&self) -> usize {
        self.last_attempt.lock().expect("retry queue poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &RetryKey) -> bool {
        self.last_attempt
            .lock()
            .expect("retry queue poisoned")
            .contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_enqueue_within_cooldown_is_noop() {
        let queue = RetryQueue::new(60);
        let key = RetryKey {
            kind: RequestKind::Passenger,
            id: 1,
        };
        let now = Utc::now();
        assert!(queue.enqueue(key, now));
        assert!(!queue.enqueue(key, now + Duration::minutes(10)));
        assert!(queue.enqueue(key, now + Duration::minutes(61)));
    }
}
