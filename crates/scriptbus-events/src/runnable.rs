use std::ops::{AddAssign, SubAssign};
use std::sync::Arc;

use crate::connected::{ConnectedEvent, Fanout};
use crate::ending::{DetachedEnding, EndingRegistry, HostCallback};
use crate::error::EventError;
use crate::listener::{Listener, ListenerHandle, ListenerResult};

/// Handle to a zero-argument listener
pub type RunnableHandle = ListenerHandle<()>;

/// A zero-argument event.
///
/// Either bridged to a host notification that takes plain callbacks, or, when
/// built with [`RunnableEvent::local`], a purely local broadcaster fired with
/// [`RunnableEvent::invoke`].
pub struct RunnableEvent {
    inner: ConnectedEvent<dyn Listener<()>, HostCallback>,
}

impl RunnableEvent {
    /// Bridge to a host notification through `connector` / `disconnector`
    pub fn new<C, D>(ending: Arc<dyn EndingRegistry>, connector: C, disconnector: D) -> Self
    where
        C: Fn(HostCallback) + Send + Sync + 'static,
        D: Fn(HostCallback) + Send + Sync + 'static,
    {
        Self {
            inner: ConnectedEvent::new(ending, connector, disconnector, fan_out),
        }
    }

    /// An event with no host source
    pub fn local() -> Self {
        Self::new(Arc::new(DetachedEnding), |_| {}, |_| {})
    }

    pub fn add(&self, listener: RunnableHandle) -> RunnableHandle {
        self.inner.add(listener)
    }

    /// Wrap a closure as a listener and add it.
    ///
    /// Returns the created handle for later use with [`RunnableEvent::remove`].
    pub fn add_fn<F>(&self, callback: F) -> RunnableHandle
    where
        F: Fn() -> ListenerResult + Send + Sync + 'static,
    {
        self.add(Arc::new(callback))
    }

    pub fn remove(&self, listener: &RunnableHandle) {
        self.inner.remove(listener)
    }

    /// Fire every listener now
    pub fn invoke(&self) -> Result<(), EventError> {
        self.inner.fire(|listener| listener.on_event(()))
    }

    pub fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    /// The callback registered with the host source
    pub fn adapter(&self) -> &HostCallback {
        self.inner.adapter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for RunnableEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnableEvent")
            .field("listeners", &self.len())
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl AddAssign<RunnableHandle> for RunnableEvent {
    fn add_assign(&mut self, listener: RunnableHandle) {
        self.add(listener);
    }
}

impl SubAssign<&RunnableHandle> for RunnableEvent {
    fn sub_assign(&mut self, listener: &RunnableHandle) {
        self.remove(listener);
    }
}

fn fan_out(fanout: Fanout<dyn Listener<()>>) -> HostCallback {
    Arc::new(move || -> ListenerResult {
        fanout.for_each_as_receiver(|listener| listener.on_event(()))?;
        Ok(())
    })
}
