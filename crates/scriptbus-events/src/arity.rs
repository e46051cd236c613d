use std::ops::{AddAssign, SubAssign};
use std::sync::Arc;

use crate::bus::EventBus;
use crate::error::EventError;
use crate::listener::{Listener, ListenerHandle, ListenerResult};

/// A local event whose listeners take the tuple `Args`.
///
/// These are plain buses with no host source. Use the `Event1`..`Event5`
/// aliases; `add_fn` and `invoke` are available for each arity.
pub struct Event<Args> {
    bus: EventBus<dyn Listener<Args>>,
}

pub type Event1<A> = Event<(A,)>;
pub type Event2<A, B> = Event<(A, B)>;
pub type Event3<A, B, C> = Event<(A, B, C)>;
pub type Event4<A, B, C, D> = Event<(A, B, C, D)>;
pub type Event5<A, B, C, D, E> = Event<(A, B, C, D, E)>;

impl<Args> Event<Args> {
    pub fn new() -> Self {
        Self {
            bus: EventBus::new(),
        }
    }

    pub fn add(&self, listener: ListenerHandle<Args>) -> ListenerHandle<Args> {
        self.bus.add(listener)
    }

    pub fn remove(&self, listener: &ListenerHandle<Args>) {
        self.bus.remove(listener)
    }

    pub fn fire<F>(&self, f: F) -> Result<(), EventError>
    where
        F: FnMut(&(dyn Listener<Args> + 'static)) -> ListenerResult,
    {
        self.bus.fire(f)
    }

    pub fn len(&self) -> usize {
        self.bus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bus.is_empty()
    }
}

impl<Args> Default for Event<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Event<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("listeners", &self.bus.len())
            .finish()
    }
}

impl<Args> AddAssign<ListenerHandle<Args>> for Event<Args> {
    fn add_assign(&mut self, listener: ListenerHandle<Args>) {
        self.add(listener);
    }
}

impl<Args> SubAssign<&ListenerHandle<Args>> for Event<Args> {
    fn sub_assign(&mut self, listener: &ListenerHandle<Args>) {
        self.remove(listener);
    }
}

macro_rules! impl_event_arity {
    ($($arg:ident: $ty:ident),+) => {
        impl<$($ty),+> Event<($($ty,)+)>
        where
            $($ty: Clone + 'static),+
        {
            /// Wrap a closure as a listener and add it
            pub fn add_fn<F>(&self, callback: F) -> ListenerHandle<($($ty,)+)>
            where
                F: Fn($($ty),+) -> ListenerResult + Send + Sync + 'static,
            {
                self.add(Arc::new(callback))
            }

            /// Fire every listener with a clone of the arguments
            pub fn invoke(&self, $($arg: $ty),+) -> Result<(), EventError> {
                self.fire(|listener| listener.on_event(($($arg.clone(),)+)))
            }
        }
    };
}

impl_event_arity!(a: A);
impl_event_arity!(a: A, b: B);
impl_event_arity!(a: A, b: B, c: C);
impl_event_arity!(a: A, b: B, c: C, d: D);
impl_event_arity!(a: A, b: B, c: C, d: D, e: E);
