//! In-memory session store

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::SessionError;
use crate::payload::{Payload, ID_KEY};

/// Hyphenated UUID v4 string, 36 characters, 122 random bits.
pub type SessionId = String;

const REDACTED_PREFIX_LEN: usize = 8;

/// Log-safe form of a session id: the first characters followed by `...`.
///
/// A session id authenticates its bearer, so only this form may reach logs
/// and error messages.
pub fn redact(id: &str) -> String {
    let prefix: String = id.chars().take(REDACTED_PREFIX_LEN).collect();
    format!("{}...", prefix)
}

struct Session {
    payload: Payload,
    last_activity: Instant,
}

impl Session {
    fn new(now: Instant) -> Self {
        Self {
            payload: Payload::new(),
            last_activity: now,
        }
    }

    fn is_expired(&self, now: Instant, lifetime: Duration) -> bool {
        now.saturating_duration_since(self.last_activity) > lifetime
    }
}

/// Process-wide map of session id to payload and last-activity timestamp.
///
/// Every operation takes the lock for the duration of its map access only and
/// never awaits while holding it. The store does not log.
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, Session>>,
    lifetime: Option<Duration>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SessionStore {
    /// `None` or a zero lifetime disables expiry.
    pub fn new(lifetime: Option<Duration>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            lifetime: lifetime.filter(|d| !d.is_zero()),
        }
    }

    pub fn lifetime(&self) -> Option<Duration> {
        self.lifetime
    }

    /// Allocates a fresh id and inserts an empty session stamped with the current time.
    pub fn create(&self) -> SessionId {
        let now = Instant::now();
        let mut sessions = self.sessions.lock();
        loop {
            let id = Uuid::new_v4().to_string();
            if !sessions.contains_key(&id) {
                sessions.insert(id.clone(), Session::new(now));
                return id;
            }
        }
    }

    pub fn exists(&self, id: &str) -> bool {
        self.sessions.lock().contains_key(id)
    }

    /// Replaces the payload of an existing session and refreshes its activity.
    pub fn save(&self, id: &str, payload: Payload) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        session.payload = payload;
        session.last_activity = Instant::now();
        Ok(())
    }

    /// Returns a copy of the payload with the id under `"id"` and refreshes activity.
    pub fn load(&self, id: &str) -> Result<Payload, SessionError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        session.last_activity = Instant::now();

        let mut payload = session.payload.clone();
        payload.insert(ID_KEY, id.to_string());
        Ok(payload)
    }

    /// Idempotent: removing an absent session returns an empty list.
    pub fn remove(&self, id: &str) -> Vec<SessionId> {
        match self.sessions.lock().remove_entry(id) {
            Some((id, _)) => vec![id],
            None => Vec::new(),
        }
    }

    /// Removes every session idle for longer than the lifetime and returns their ids.
    pub fn sweep(&self) -> Vec<SessionId> {
        let Some(lifetime) = self.lifetime else {
            return Vec::new();
        };

        let now = Instant::now();
        let mut sessions = self.sessions.lock();
        let expired: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, session)| session.is_expired(now, lifetime))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            sessions.remove(id);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_keeps_only_a_prefix() {
        let store = SessionStore::default();
        let id = store.create();

        let redacted = redact(&id);
        assert_eq!(redacted, format!("{}...", &id[..8]));
        assert!(!redacted.contains(&id[8..]));
        assert_eq!(redact("abc"), "abc...");
    }

    #[test]
    fn test_not_found_message_hides_id() {
        let store = SessionStore::default();
        let id = store.create();
        store.remove(&id);

        let message = store.load(&id).unwrap_err().to_string();
        assert!(message.contains(&redact(&id)));
        assert!(!message.contains(&id));
    }
    use std::collections::HashSet;
    use std::sync::Arc;

    fn backdate(store: &SessionStore, id: &str, by: Duration) {
        let mut sessions = store.sessions.lock();
        let session = sessions.get_mut(id).unwrap();
        session.last_activity = session.last_activity.checked_sub(by).unwrap();
    }

    #[test]
    fn test_create_returns_uuid_shaped_id() {
        let store = SessionStore::default();
        let id = store.create();

        assert_eq!(id.len(), 36);
        assert_eq!(Uuid::parse_str(&id).unwrap().get_version_num(), 4);
        for pos in [8, 13, 18, 23] {
            assert_eq!(id.as_bytes()[pos], b'-');
        }
    }

    #[test]
    fn test_create_ids_are_unique() {
        let store = SessionStore::default();
        let ids: HashSet<SessionId> = (0..10_000).map(|_| store.create()).collect();

        assert_eq!(ids.len(), 10_000);
        assert_eq!(store.len(), 10_000);
    }

    #[test]
    fn test_lifecycle() {
        let store = SessionStore::default();
        let id = store.create();
        assert!(store.exists(&id));

        assert_eq!(store.remove(&id), vec![id.clone()]);
        assert!(!store.exists(&id));

        // second removal is not an error
        assert!(store.remove(&id).is_empty());
        assert!(store.remove("never-created").is_empty());
    }

    #[test]
    fn test_new_session_is_empty() {
        let store = SessionStore::default();
        let id = store.create();
        let payload = store.load(&id).unwrap();

        assert_eq!(payload.len(), 1);
        assert_eq!(payload.id(), Some(id.as_str()));
    }

    #[test]
    fn test_save_then_load_merges_id() {
        let store = SessionStore::default();
        let id = store.create();
        store.save(&id, Payload::new().with("a", 1_i32)).unwrap();

        let payload = store.load(&id).unwrap();
        assert_eq!(payload.get::<i32>("a"), Some(&1));
        assert_eq!(payload.id(), Some(id.as_str()));
    }

    #[test]
    fn test_save_replaces_payload() {
        let store = SessionStore::default();
        let id = store.create();
        store.save(&id, Payload::new().with("a", 1_i32)).unwrap();
        store.save(&id, Payload::new().with("b", 2_i32)).unwrap();

        let payload = store.load(&id).unwrap();
        assert!(!payload.contains_key("a"));
        assert_eq!(payload.get::<i32>("b"), Some(&2));
    }

    #[test]
    fn test_not_found() {
        let store = SessionStore::default();
        let missing = "00000000-0000-4000-8000-000000000000";

        assert_eq!(
            store.save(missing, Payload::new()),
            Err(SessionError::NotFound(missing.to_string()))
        );
        assert!(matches!(store.load(missing), Err(SessionError::NotFound(_))));

        let id = store.create();
        store.remove(&id);
        assert!(matches!(store.load(&id), Err(SessionError::NotFound(_))));
        assert!(matches!(store.save(&id, Payload::new()), Err(SessionError::NotFound(_))));
    }

    #[test]
    fn test_sweep_removes_idle_sessions() {
        let lifetime = Duration::from_secs(60);
        let store = SessionStore::new(Some(lifetime));
        let stale = store.create();
        let fresh = store.create();
        backdate(&store, &stale, lifetime + Duration::from_millis(1));

        assert_eq!(store.sweep(), vec![stale.clone()]);
        assert!(!store.exists(&stale));
        assert!(store.exists(&fresh));
    }

    #[test]
    fn test_sweep_empty_store() {
        let store = SessionStore::new(Some(Duration::from_secs(1)));
        assert!(store.sweep().is_empty());
    }

    #[test]
    fn test_sweep_disabled_without_lifetime() {
        let store = SessionStore::new(Some(Duration::ZERO));
        assert!(store.lifetime().is_none());

        let id = store.create();
        backdate(&store, &id, Duration::from_secs(1));
        assert!(store.sweep().is_empty());
        assert!(store.exists(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_refreshes_activity() {
        let store = SessionStore::new(Some(Duration::from_secs(10)));
        let id = store.create();

        tokio::time::advance(Duration::from_secs(8)).await;
        store.load(&id).unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;

        assert!(store.sweep().is_empty());

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(store.sweep(), vec![id]);
    }

    #[test]
    fn test_concurrent_access() {
        let store = Arc::new(SessionStore::new(Some(Duration::from_secs(3600))));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let id = store.create();
                        store.save(&id, Payload::new().with("n", 1_u8)).unwrap();
                        store.sweep();
                        assert_eq!(store.remove(&id), vec![id]);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(store.is_empty());
    }
}
