//! Browser-session scoped storage for pending authorizations.
//!
//! Each browser session is identified by an opaque id carried in a cookie.
//! The store holds string values under fixed keys for the duration of one
//! authorization round trip.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Key under which the `state` value is stored.
pub const STATE_KEY: &str = "epic_auth_state";

/// Key under which the PKCE verifier is stored.
pub const PKCE_VERIFIER_KEY: &str = "pkce_verifier";

/// Cleanup interval: 1 minute.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

struct SessionEntry {
    values: HashMap<String, String>,
    created_at: Instant,
}

/// In-memory session store.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    /// Generate a new session id (128 random bits).
    #[must_use]
    pub fn new_session_id() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    /// Get a handle bound to one session.
    #[must_use]
    pub fn session(&self, id: impl Into<String>) -> Session {
        Session { store: self.clone(), id: id.into() }
    }

    async fn set_item(&self, id: &str, key: &str, value: String) {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.entry(id.to_owned()).or_insert_with(|| SessionEntry {
            values: HashMap::new(),
            created_at: Instant::now(),
        });
        // A new write restarts the round trip.
        entry.created_at = Instant::now();
        entry.values.insert(key.to_owned(), value);
    }

    async fn get_item(&self, id: &str, key: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(id)?;
        if entry.created_at.elapsed() > self.ttl {
            return None;
        }
        entry.values.get(key).cloned()
    }

    async fn take_item(&self, id: &str, key: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        let expired = entry.created_at.elapsed() > self.ttl;
        let value = entry.values.remove(key);
        if entry.values.is_empty() {
            sessions.remove(id);
        }
        if expired { None } else { value }
    }

    /// Number of sessions with pending values.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Start background cleanup task for expired sessions.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                self.cleanup_expired().await;
            }
        });
    }

    async fn cleanup_expired(&self) {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.created_at.elapsed() <= self.ttl);
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(count = removed, "Cleaned up expired pending authorizations");
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(crate::config::api::PENDING_AUTH_TTL)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("ttl", &self.ttl).finish()
    }
}

/// Storage scoped to a single browser session.
#[derive(Clone)]
pub struct Session {
    store: SessionStore,
    id: String,
}

impl Session {
    /// Session id (the cookie value).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Store a value under `key`, replacing any previous one.
    pub async fn set_item(&self, key: &str, value: String) {
        self.store.set_item(&self.id, key, value).await;
    }

    /// Read a value without consuming it.
    pub async fn get_item(&self, key: &str) -> Option<String> {
        self.store.get_item(&self.id, key).await
    }

    /// Read and remove a value.
    pub async fn take_item(&self, key: &str) -> Option<String> {
        self.store.take_item(&self.id, key).await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = SessionStore::default();
        let session = store.session("s1");
        session.set_item(STATE_KEY, "abc".into()).await;

        assert_eq!(session.get_item(STATE_KEY).await.as_deref(), Some("abc"));
        // Reading does not consume
        assert_eq!(session.get_item(STATE_KEY).await.as_deref(), Some("abc"));
        assert!(session.get_item(PKCE_VERIFIER_KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::default();
        store.session("a").set_item(STATE_KEY, "one".into()).await;
        store.session("b").set_item(STATE_KEY, "two".into()).await;

        assert_eq!(store.session("a").get_item(STATE_KEY).await.as_deref(), Some("one"));
        assert_eq!(store.session("b").get_item(STATE_KEY).await.as_deref(), Some("two"));
        assert!(store.session("c").get_item(STATE_KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_take_consumes_and_drops_empty_session() {
        let store = SessionStore::default();
        let session = store.session("s1");
        session.set_item(STATE_KEY, "abc".into()).await;
        session.set_item(PKCE_VERIFIER_KEY, "def".into()).await;

        assert_eq!(session.take_item(STATE_KEY).await.as_deref(), Some("abc"));
        assert!(session.take_item(STATE_KEY).await.is_none());
        assert_eq!(store.session_count().await, 1);

        assert_eq!(session.take_item(PKCE_VERIFIER_KEY).await.as_deref(), Some("def"));
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_expired_values_are_hidden() {
        let store = SessionStore::new(Duration::ZERO);
        let session = store.session("s1");
        session.set_item(STATE_KEY, "abc".into()).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(session.get_item(STATE_KEY).await.is_none());
        store.cleanup_expired().await;
        assert_eq!(store.session_count().await, 0);
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionStore::new_session_id(), SessionStore::new_session_id());
    }
}
