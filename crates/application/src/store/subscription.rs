//! Observer registration for store state changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use pokedex_domain::CatalogState;

type Listener = Arc<dyn Fn(&CatalogState) + Send + Sync>;

/// Registered listeners, notified in registration order.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl SubscriberRegistry {
    pub(crate) fn subscribe(self: &Arc<Self>, listener: Listener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, listener));
        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    fn remove(&self, id: u64) {
        self.listeners.lock().retain(|(existing, _)| *existing != id);
    }

    /// Calls every listener with `snapshot`.
    ///
    /// The listener list is copied first so callbacks may subscribe or
    /// unsubscribe without deadlocking.
    pub(crate) fn notify(&self, snapshot: &CatalogState) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.lock().len()
    }
}

/// Handle returned by [`CatalogStore::subscribe`](super::CatalogStore::subscribe).
///
/// The listener stays registered until this handle is dropped or
/// [`Subscription::unsubscribe`] is called.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<SubscriberRegistry>,
}

impl Subscription {
    /// Removes the listener.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
