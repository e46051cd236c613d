use std::ops::{AddAssign, SubAssign};
use std::sync::Arc;
use tracing::debug;

use crate::error::EventError;
use crate::listener::ListenerResult;
use crate::listener_set::ListenerSet;

/// Lifecycle hooks run by an [`EventBus`] when its listener population
/// changes between empty and non-empty.
///
/// Hooks run after the listener lock is released. An `add` and a `remove`
/// racing across the empty boundary may therefore call `connect` and
/// `disconnect` in the opposite order to the structural changes, leaving a
/// connected bus with no listeners until the next transition. Implementations
/// must tolerate repeated or out-of-order calls.
pub trait BusHooks: Send + Sync {
    /// Called after an `add` that made the bus non-empty
    fn connect(&self) {}

    /// Called after a `remove` that made the bus empty
    fn disconnect(&self) {}
}

/// Hooks that do nothing; used by purely local buses
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl BusHooks for NoHooks {}

/// Ordered collection of listeners with add/remove/fire.
///
/// Duplicates are allowed and each copy fires independently. Listeners are
/// identified by handle, so `remove` needs the `Arc` that `add` returned.
pub struct EventBus<L: ?Sized, H = NoHooks> {
    listeners: Arc<ListenerSet<L>>,
    hooks: H,
}

impl<L: ?Sized> EventBus<L> {
    /// Create a local bus with no lifecycle hooks
    pub fn new() -> Self {
        Self::with_hooks(Arc::new(ListenerSet::new()), NoHooks)
    }
}

impl<L: ?Sized> Default for EventBus<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized, H: BusHooks> EventBus<L, H> {
    /// Create a bus over an existing listener set.
    ///
    /// The set is shared so that hooks (such as a host adapter) can dispatch
    /// to the same listeners.
    pub fn with_hooks(listeners: Arc<ListenerSet<L>>, hooks: H) -> Self {
        Self { listeners, hooks }
    }

    /// Add a listener and connect if this was the first one.
    ///
    /// Returns the same handle so inline listeners can be removed later.
    pub fn add(&self, listener: Arc<L>) -> Arc<L> {
        let was_empty = self.listeners.push(listener.clone());
        if was_empty {
            debug!(target: "events", "First listener added, connecting");
            self.hooks.connect();
        }
        listener
    }

    /// Remove the first occurrence of a listener and disconnect if none are
    /// left. Unknown listeners are ignored.
    pub fn remove(&self, listener: &Arc<L>) {
        match self.listeners.remove(listener) {
            Some(0) => {
                debug!(target: "events", "Last listener removed, disconnecting");
                self.hooks.disconnect();
            }
            Some(_) => {}
            None => {
                debug!(target: "events", "Ignoring removal of unknown listener");
            }
        }
    }

    /// Run `f` against each listener in insertion order.
    ///
    /// The first error stops the firing and is returned; later listeners are
    /// not called.
    pub fn fire<F>(&self, mut f: F) -> Result<(), EventError>
    where
        F: FnMut(&L) -> ListenerResult,
    {
        self.listeners.dispatch(|listener| f(listener.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn contains(&self, listener: &Arc<L>) -> bool {
        self.listeners.contains(listener)
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn listeners(&self) -> &Arc<ListenerSet<L>> {
        &self.listeners
    }
}

impl<L: ?Sized, H: BusHooks> AddAssign<Arc<L>> for EventBus<L, H> {
    fn add_assign(&mut self, listener: Arc<L>) {
        self.add(listener);
    }
}

impl<L: ?Sized, H: BusHooks> SubAssign<&Arc<L>> for EventBus<L, H> {
    fn sub_assign(&mut self, listener: &Arc<L>) {
        self.remove(listener);
    }
}

impl<L: ?Sized, H> std::fmt::Debug for EventBus<L, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
