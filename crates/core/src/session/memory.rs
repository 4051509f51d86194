use super::SessionStore;
use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

struct Entry {
    value: Value,
    touched: Instant,
}

/// Process-local session store with idle expiry.
pub struct InMemorySessionStore {
    sessions: DashMap<String, Entry>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.touched) >= self.ttl
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions.insert(
            id.clone(),
            Entry {
                value: Value::Null,
                touched: Instant::now(),
            },
        );
        debug!("Created session {}", id);
        id
    }

    fn get(&self, id: &str) -> Option<Value> {
        let now = Instant::now();
        let mut entry = self.sessions.get_mut(id)?;
        if self.is_expired(&entry, now) {
            drop(entry);
            self.sessions.remove(id);
            debug!("Session {} expired", id);
            return None;
        }
        entry.touched = now;
        Some(entry.value.clone())
    }

    fn put(&self, id: &str, value: Value) {
        self.sessions.insert(
            id.to_string(),
            Entry {
                value,
                touched: Instant::now(),
            },
        );
    }

    fn remove(&self, id: &str) -> Option<Value> {
        self.sessions.remove(id).map(|(_, entry)| entry.value)
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| !self.is_expired(entry, now));
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            debug!("Purged {} expired sessions", purged);
        }
        purged
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_put_get() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let id = store.create();
        assert_eq!(store.get(&id), Some(Value::Null));

        store.put(&id, json!({"turns": 1}));
        assert_eq!(store.get(&id), Some(json!({"turns": 1})));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_returns_distinct_ids() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        assert_ne!(store.create(), store.create());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_expired_session_is_gone() {
        let store = InMemorySessionStore::new(Duration::ZERO);
        store.put("t-1", json!(1));
        assert!(store.get("t-1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let store = InMemorySessionStore::new(Duration::ZERO);
        store.put("a", json!(1));
        store.put("b", json!(2));
        assert_eq!(store.purge_expired(), 2);
        assert!(store.is_empty());

        let store = InMemorySessionStore::new(Duration::from_secs(3600));
        store.put("a", json!(1));
        assert_eq!(store.purge_expired(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        store.put("a", json!("x"));
        assert_eq!(store.remove("a"), Some(json!("x")));
        assert!(store.remove("a").is_none());
    }
}
