//! Events bridged to a host-owned event source.
//!
//! A [`ConnectedEvent`] keeps its listeners locally and registers a single
//! adapter with the host only while it has at least one listener. The first
//! connect also registers a host ending hook that detaches the adapter when
//! the run ends, so a stale adapter never fires into the next run.

use std::ops::{AddAssign, SubAssign};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::bus::{BusHooks, EventBus};
use crate::ending::EndingRegistry;
use crate::error::EventError;
use crate::listener::ListenerResult;
use crate::listener_set::ListenerSet;

type Connector<T> = Box<dyn Fn(T) + Send + Sync>;
type AdapterFactory<L, T> = Box<dyn Fn(Fanout<L>) -> T + Send + Sync>;

/// Dispatch primitives handed to an adapter factory.
///
/// The adapter built from these fans a single host callback out to every
/// local listener.
pub struct Fanout<L: ?Sized> {
    listeners: Arc<ListenerSet<L>>,
}

impl<L: ?Sized> Clone for Fanout<L> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<L: ?Sized> Fanout<L> {
    /// Run `f` with each listener as the receiver
    pub fn for_each_as_receiver<F>(&self, mut f: F) -> Result<(), EventError>
    where
        F: FnMut(&L) -> ListenerResult,
    {
        self.listeners.dispatch(|listener| f(listener.as_ref()))
    }

    /// Run `f` with each listener handle as the argument
    pub fn for_each_as_argument<F>(&self, f: F) -> Result<(), EventError>
    where
        F: FnMut(&Arc<L>) -> ListenerResult,
    {
        self.listeners.dispatch(f)
    }
}

struct BridgeState<L: ?Sized, T> {
    connector: Connector<T>,
    disconnector: Connector<T>,
    factory: AdapterFactory<L, T>,
    fanout: Fanout<L>,
    adapter: OnceLock<T>,
    connected: AtomicBool,
    setup_done: AtomicBool,
    ending: Arc<dyn EndingRegistry>,
}

impl<L, T> BridgeState<L, T>
where
    L: ?Sized + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn adapter(&self) -> &T {
        self.adapter
            .get_or_init(|| (self.factory)(self.fanout.clone()))
    }

    fn connect(self: &Arc<Self>) {
        if self
            .connected
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        debug!(target: "events", "Connecting adapter to host source");
        (self.connector)(self.adapter().clone());

        if !self.setup_done.swap(true, Ordering::AcqRel) {
            let state = Arc::downgrade(self);
            self.ending.add_ending_listener(Arc::new(move || -> ListenerResult {
                if let Some(state) = state.upgrade() {
                    debug!(target: "events", "Run ending, detaching adapter");
                    state.disconnect();
                }
                Ok(())
            }));
        }
    }

    fn disconnect(&self) {
        if !self.connected.swap(false, Ordering::AcqRel) {
            return;
        }

        debug!(target: "events", "Disconnecting adapter from host source");
        (self.disconnector)(self.adapter().clone());
    }
}

/// Bus hooks that attach and detach a host adapter
pub struct Bridge<L: ?Sized, T> {
    state: Arc<BridgeState<L, T>>,
}

impl<L, T> Bridge<L, T>
where
    L: ?Sized + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::Acquire)
    }

    /// The memoized adapter instance, created on first access
    pub fn adapter(&self) -> &T {
        self.state.adapter()
    }
}

impl<L, T> BusHooks for Bridge<L, T>
where
    L: ?Sized + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn connect(&self) {
        self.state.connect();
    }

    fn disconnect(&self) {
        self.state.disconnect();
    }
}

/// An [`EventBus`] bridged to one host event source.
///
/// `L` is the local listener type and `T` the listener type the host source
/// expects. `connector` and `disconnector` register and unregister the adapter
/// with the host; `adapter_factory` builds that adapter from a [`Fanout`] over
/// this event's listeners.
pub struct ConnectedEvent<L: ?Sized, T> {
    bus: EventBus<L, Bridge<L, T>>,
}

impl<L, T> ConnectedEvent<L, T>
where
    L: ?Sized + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new<C, D, F>(
        ending: Arc<dyn EndingRegistry>,
        connector: C,
        disconnector: D,
        adapter_factory: F,
    ) -> Self
    where
        C: Fn(T) + Send + Sync + 'static,
        D: Fn(T) + Send + Sync + 'static,
        F: Fn(Fanout<L>) -> T + Send + Sync + 'static,
    {
        let listeners = Arc::new(ListenerSet::new());
        let state = BridgeState {
            connector: Box::new(connector),
            disconnector: Box::new(disconnector),
            factory: Box::new(adapter_factory),
            fanout: Fanout {
                listeners: listeners.clone(),
            },
            adapter: OnceLock::new(),
            connected: AtomicBool::new(false),
            setup_done: AtomicBool::new(false),
            ending,
        };

        Self {
            bus: EventBus::with_hooks(
                listeners,
                Bridge {
                    state: Arc::new(state),
                },
            ),
        }
    }

    /// Add a listener, connecting to the host source if not connected.
    ///
    /// Listeners that outlive a run stay registered locally after the run
    /// ending detaches the adapter, so the next add attaches it again even
    /// though the bus was not empty.
    pub fn add(&self, listener: Arc<L>) -> Arc<L> {
        let listener = self.bus.add(listener);
        let bridge = self.bus.hooks();
        if !bridge.is_connected() {
            bridge.connect();
        }
        listener
    }

    /// Remove a listener, disconnecting from the host source if it was the
    /// last
    pub fn remove(&self, listener: &Arc<L>) {
        self.bus.remove(listener)
    }

    /// Run `f` against each listener in insertion order, stopping at the
    /// first error
    pub fn fire<F>(&self, f: F) -> Result<(), EventError>
    where
        F: FnMut(&L) -> ListenerResult,
    {
        self.bus.fire(f)
    }

    pub fn is_connected(&self) -> bool {
        self.bus.hooks().is_connected()
    }

    pub fn adapter(&self) -> &T {
        self.bus.hooks().adapter()
    }

    pub fn len(&self) -> usize {
        self.bus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bus.is_empty()
    }

    pub fn contains(&self, listener: &Arc<L>) -> bool {
        self.bus.contains(listener)
    }
}

impl<L, T> AddAssign<Arc<L>> for ConnectedEvent<L, T>
where
    L: ?Sized + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn add_assign(&mut self, listener: Arc<L>) {
        self.add(listener);
    }
}

impl<L, T> SubAssign<&Arc<L>> for ConnectedEvent<L, T>
where
    L: ?Sized + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn sub_assign(&mut self, listener: &Arc<L>) {
        self.remove(listener);
    }
}

impl<L, T> std::fmt::Debug for ConnectedEvent<L, T>
where
    L: ?Sized + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectedEvent")
            .field("listeners", &self.len())
            .field("connected", &self.is_connected())
            .finish()
    }
}
