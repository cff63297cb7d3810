//! Cookie-backed in-memory sessions.
//!
//! A [`SessionStore`] is a process-wide map from opaque token to a per-client
//! data bag. The dispatcher resolves the token presented in the `session`
//! cookie on every request: a known token returns its existing bag untouched,
//! anything else (no cookie, empty value, unknown token) mints a fresh token
//! with an empty bag. Every response re-sets the cookie, refreshing the
//! client's window.
//!
//! Sessions live until the process exits. There is no expiry sweep and no
//! deletion API — the `max-age` sent to the client is advisory only. That is
//! a known gap, kept deliberately; see DESIGN.md before "fixing" it.
//!
//! The check-then-create sequence runs under a single `Mutex`, so two
//! concurrent first contacts cannot corrupt the map, and a read-modify-write
//! through [`Session::update`] is atomic with respect to other in-flight
//! requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use uuid::Uuid;

/// The open key-value bag attached to one session. Values are JSON scalars or
/// simple structures — whatever `serde_json::Value` holds.
pub type SessionBag = serde_json::Map<String, Value>;

/// Process-wide session storage. One per [`Dispatcher`](crate::Dispatcher).
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionBag>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a presented token to a live session token.
    ///
    /// A non-empty token already in the store is returned unchanged. Anything
    /// else mints a new UUIDv4 token, retried until it collides with no live
    /// session, and stores an empty bag under it. The whole sequence holds the
    /// store lock, so concurrent requests never race the check against the
    /// insert.
    pub fn resolve(&self, presented: Option<&str>) -> String {
        let mut sessions = self.lock();

        if let Some(token) = presented
            && !token.is_empty()
            && sessions.contains_key(token)
        {
            return token.to_owned();
        }

        let mut token = Uuid::new_v4().to_string();
        while sessions.contains_key(&token) {
            token = Uuid::new_v4().to_string();
        }
        sessions.insert(token.clone(), SessionBag::new());
        token
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionBag>> {
        // A poisoned lock means a handler panicked mid-update; the bag data
        // is still structurally sound, so keep serving.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A handle to one resolved session, carried on the [`Request`](crate::Request).
///
/// Cloning is cheap — the handle is a token plus an `Arc` to the store.
#[derive(Clone)]
pub struct Session {
    token: String,
    store: Arc<SessionStore>,
}

impl Session {
    pub(crate) fn new(token: String, store: Arc<SessionStore>) -> Self {
        Self { token, store }
    }

    /// The opaque token identifying this session, as sent in the cookie.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns a clone of the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.update(|bag| bag.get(key).cloned())
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        self.update(|bag| {
            bag.insert(key.to_owned(), value);
        });
    }

    /// Runs `f` against the bag under the store lock.
    ///
    /// Use this when a handler must read and write in one step — e.g. a view
    /// counter — so no other in-flight request interleaves.
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionBag) -> R) -> R {
        let mut sessions = self.store.lock();
        let bag = sessions.entry(self.token.clone()).or_default();
        f(bag)
    }

    /// Increments the integer counter under `key` and returns the new value.
    /// A missing or non-integer value counts as zero.
    pub fn increment(&self, key: &str) -> i64 {
        self.update(|bag| {
            let n = bag.get(key).and_then(Value::as_i64).unwrap_or(0) + 1;
            bag.insert(key.to_owned(), Value::from(n));
            n
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_contact_mints_a_token_with_an_empty_bag() {
        let store = SessionStore::new();
        let token = store.resolve(None);
        assert!(!token.is_empty());

        let again = store.resolve(Some(&token));
        assert_eq!(token, again);
    }

    #[test]
    fn empty_and_unknown_tokens_mint_fresh_sessions() {
        let store = SessionStore::new();
        let a = store.resolve(Some(""));
        let b = store.resolve(Some("not-a-real-token"));
        let c = store.resolve(None);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn bag_data_survives_across_resolves() {
        let store = Arc::new(SessionStore::new());
        let token = store.resolve(None);

        let session = Session::new(token.clone(), Arc::clone(&store));
        session.set("name", "smaug");

        let token = store.resolve(Some(&token));
        let session = Session::new(token, store);
        assert_eq!(session.get("name"), Some(Value::from("smaug")));
    }

    #[test]
    fn increment_is_monotonic_per_session() {
        let store = Arc::new(SessionStore::new());
        let token = store.resolve(None);
        let session = Session::new(token, store);

        assert_eq!(session.increment("views"), 1);
        assert_eq!(session.increment("views"), 2);
        assert_eq!(session.increment("views"), 3);
    }
}
