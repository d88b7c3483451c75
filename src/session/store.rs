//! Session storage keyed by user id.
//!
//! Each session sits behind its own mutex: messages from one user are handled
//! one at a time while different users proceed independently.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use dashmap::DashMap;

use super::{Session, UserId, now_secs};

/// Shared handle to one user's session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Lock a session, recovering the state if a previous holder panicked.
pub fn lock(handle: &SessionHandle) -> MutexGuard<'_, Session> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Storage for sessions.
pub trait SessionStore: Send + Sync {
    /// Existing session for `user`, or a fresh one. The session is marked
    /// active before it is handed out, so idle eviction cannot race the caller.
    fn get_or_create(&self, user: &str) -> SessionHandle;

    fn get(&self, user: &str) -> Option<SessionHandle>;

    /// Insert or replace a session.
    fn put(&self, session: Session);

    /// Remove a session. Returns whether it existed.
    fn evict(&self, user: &str) -> bool;

    /// Remove sessions idle for more than `max_idle_secs` at time `now`.
    /// Sessions currently being handled are kept.
    fn evict_idle(&self, max_idle_secs: u64, now: u64) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process store, lost on restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<UserId, SessionHandle>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get_or_create(&self, user: &str) -> SessionHandle {
        // The entry guard holds the shard lock that `retain` needs.
        let entry = self
            .sessions
            .entry(user.to_string())
            .or_insert_with(|| {
                tracing::debug!(user, "session created");
                Arc::new(Mutex::new(Session::new(user)))
            });
        lock(entry.value()).touch();
        Arc::clone(entry.value())
    }

    fn get(&self, user: &str) -> Option<SessionHandle> {
        self.sessions.get(user).map(|h| Arc::clone(h.value()))
    }

    fn put(&self, session: Session) {
        self.sessions
            .insert(session.user_id.clone(), Arc::new(Mutex::new(session)));
    }

    fn evict(&self, user: &str) -> bool {
        self.sessions.remove(user).is_some()
    }

    fn evict_idle(&self, max_idle_secs: u64, now: u64) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.idle_secs(now) <= max_idle_secs,
            Err(TryLockError::Poisoned(poisoned)) => {
                poisoned.into_inner().idle_secs(now) <= max_idle_secs
            }
            Err(TryLockError::WouldBlock) => true,
        });
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(evicted, remaining = self.sessions.len(), "idle sessions evicted");
        }
        evicted
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

/// Evict against the current clock.
pub fn evict_idle_now(store: &dyn SessionStore, max_idle_secs: u64) -> usize {
    store.evict_idle(max_idle_secs, now_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Slot;
    use crate::session::Lifecycle;

    #[test]
    fn get_or_create_returns_same_session() {
        let store = MemorySessionStore::new();
        let a = store.get_or_create("alice");
        let b = store.get_or_create("alice");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn users_are_independent() {
        let store = MemorySessionStore::new();
        lock(&store.get_or_create("alice")).start();
        let bob = store.get_or_create("bob");
        assert!(!lock(&bob).answers().is_set(Slot::CarUsage));
        assert_eq!(lock(&bob).lifecycle(), Lifecycle::NotStarted);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn get_unknown_is_none() {
        let store = MemorySessionStore::new();
        assert!(store.get("nobody").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn put_replaces() {
        let store = MemorySessionStore::new();
        store.get_or_create("alice");
        let mut fresh = Session::new("alice");
        fresh.start();
        store.put(fresh);
        let handle = store.get("alice").unwrap();
        assert_eq!(lock(&handle).lifecycle(), Lifecycle::InProgress);
    }

    #[test]
    fn evict_removes() {
        let store = MemorySessionStore::new();
        store.get_or_create("alice");
        assert!(store.evict("alice"));
        assert!(!store.evict("alice"));
    }

    #[test]
    fn evict_idle_keeps_recent_and_busy_sessions() {
        let store = MemorySessionStore::new();
        for (user, last) in [("old", 100), ("recent", 950), ("busy", 0)] {
            let mut session = Session::new(user);
            session.last_activity = last;
            store.put(session);
        }
        let busy = store.get("busy").unwrap();
        let guard = lock(&busy);
        assert_eq!(store.evict_idle(300, 1000), 1);
        drop(guard);
        assert!(store.get("old").is_none());
        assert!(store.get("recent").is_some());
        assert!(store.get("busy").is_some());
    }

    #[test]
    fn handed_out_session_survives_eviction() {
        let store = MemorySessionStore::new();
        let mut stale = Session::new("u");
        stale.last_activity = 0;
        store.put(stale);

        let handle = store.get_or_create("u");
        assert_eq!(store.evict_idle(3600, now_secs()), 0);
        lock(&handle).start();

        let again = store.get_or_create("u");
        assert!(Arc::ptr_eq(&handle, &again));
        assert_eq!(lock(&again).lifecycle(), Lifecycle::InProgress);
    }

    #[test]
    fn concurrent_get_or_create_converges() {
        let store = Arc::new(MemorySessionStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.get_or_create("shared"))
            })
            .collect();
        let sessions: Vec<SessionHandle> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(sessions.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(store.len(), 1);
    }
}
