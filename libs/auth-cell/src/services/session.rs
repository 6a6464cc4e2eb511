use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use shared_models::auth::Session;

use crate::models::SubscriptionId;

type Listener = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

#[derive(Default)]
struct Inner {
    session: Option<Session>,
    listeners: BTreeMap<SubscriptionId, Listener>,
    next_id: u64,
}

/// Owned holder of the signed-in session.
///
/// Clones share the same state. Screens read `current()` synchronously and
/// subscribe to be told about sign-in, sign-out and token refresh.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<Inner>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn current(&self) -> Option<Session> {
        self.lock().session.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock().session.as_ref().map(|s| s.access_token.clone())
    }

    pub fn set(&self, session: Session) {
        debug!("Session set for user {}", session.user_id());
        self.replace(Some(session));
    }

    pub fn clear(&self) {
        debug!("Session cleared");
        self.replace(None);
    }

    /// Registers `listener` and calls it once with the current session.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(Option<&Session>) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let (id, snapshot) = {
            let mut inner = self.lock();
            inner.next_id += 1;
            let id = SubscriptionId(inner.next_id);
            inner.listeners.insert(id, Arc::clone(&listener));
            (id, inner.session.clone())
        };

        listener(snapshot.as_ref());
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().listeners.remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn replace(&self, session: Option<Session>) {
        // listeners run without the lock so they may read the store
        let (listeners, snapshot) = {
            let mut inner = self.lock();
            inner.session = session;
            let listeners: Vec<Listener> = inner.listeners.values().cloned().collect();
            (listeners, inner.session.clone())
        };

        for listener in listeners {
            listener(snapshot.as_ref());
        }
    }
}
