//! Session storage for handlers that keep conversational state.
//!
//! Handlers receive the store through their invocation context instead of
//! reaching for process-wide globals. Sessions are created explicitly and
//! expire after a period without access.

mod memory;

pub use memory::InMemorySessionStore;

use serde_json::Value;
use std::sync::Arc;

pub trait SessionStore: Send + Sync {
    /// Start a new empty session and return its id.
    fn create(&self) -> String;

    /// Current value of a live session. Reading refreshes its expiry.
    fn get(&self, id: &str) -> Option<Value>;

    /// Store a value, creating the session under `id` if needed.
    fn put(&self, id: &str, value: Value);

    fn remove(&self, id: &str) -> Option<Value>;

    /// Drop expired sessions and return how many were removed.
    fn purge_expired(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub type SharedSessionStore = Arc<dyn SessionStore>;
