// In-process publish/subscribe bus

use serde_json::Value;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Emitted when a call is rejected with HTTP 401
pub const AUTH_UNAUTHORIZED: &str = "auth:unauthorized";

/// Emitted when a call is rejected with HTTP 403
pub const AUTH_FORBIDDEN: &str = "auth:forbidden";

/// Listener callback; receives the payload passed to [`EventBus::emit`]
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

type Registry = HashMap<String, Vec<(u64, Listener)>>;

struct Inner {
    listeners: Mutex<Registry>,
    next_id: AtomicU64,
}

impl Inner {
    fn registry(&self) -> MutexGuard<'_, Registry> {
        // Listeners never run under the lock, so a poisoned registry is still consistent
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remove(&self, name: &str, id: u64) {
        let mut registry = self.registry();
        if let Some(list) = registry.get_mut(name) {
            list.retain(|(listener_id, _)| *listener_id != id);
            if list.is_empty() {
                registry.remove(name);
            }
        }
    }
}

/// Process-wide event bus.
///
/// Cloning yields another handle to the same registry. The composition root
/// creates one bus and injects it wherever events are raised or handled.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.inner.registry();
        let mut names: Vec<&String> = registry.keys().collect();
        names.sort();
        f.debug_struct("EventBus").field("events", &names).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                listeners: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register `listener` for `name`.
    ///
    /// Listeners for the same name run in registration order. The returned
    /// handle removes exactly this listener.
    pub fn subscribe<F>(&self, name: &str, listener: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        debug_assert!(!name.is_empty(), "event name must not be empty");

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .registry()
            .entry(name.to_string())
            .or_default()
            .push((id, Arc::new(listener)));

        tracing::debug!("Subscribed listener {} to '{}'", id, name);

        Subscription {
            bus: Arc::downgrade(&self.inner),
            name: name.to_string(),
            id,
        }
    }

    /// Invoke every listener currently registered for `name` with `payload`.
    ///
    /// Runs over a snapshot of the registry, so listeners may subscribe or
    /// unsubscribe while the event is being delivered. A panicking listener is
    /// logged and skipped.
    pub fn emit(&self, name: &str, payload: Value) {
        let snapshot: Vec<(u64, Listener)> = match self.inner.registry().get(name) {
            Some(list) => list.clone(),
            None => return,
        };

        tracing::debug!("Emitting '{}' to {} listener(s)", name, snapshot.len());

        for (id, listener) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(&payload))).is_err() {
                tracing::warn!("Listener {} for '{}' panicked", id, name);
            }
        }
    }

    /// Drop listeners for one event, or for every event when `name` is None
    pub fn unsubscribe_all(&self, name: Option<&str>) {
        let mut registry = self.inner.registry();
        match name {
            Some(name) => {
                registry.remove(name);
            }
            None => registry.clear(),
        }
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.inner.registry().get(name).map(Vec::len).unwrap_or(0)
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug)]
pub struct Subscription {
    bus: Weak<Inner>,
    name: String,
    id: u64,
}

impl Subscription {
    /// Remove the listener. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.bus.upgrade() {
            inner.remove(&self.name, self.id);
        }
    }

    pub fn event_name(&self) -> &str {
        &self.name
    }

    /// Tie the listener to a scope: it is removed when the guard drops
    pub fn guard(self) -> SubscriptionGuard {
        SubscriptionGuard(self)
    }
}

/// Unsubscribes on drop
#[derive(Debug)]
pub struct SubscriptionGuard(Subscription);

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.0.unsubscribe();
    }
}
