//! Listener buses and host-bridged events for scriptbus
//!
//! This crate provides the in-process observer layer used by scripts:
//! plain buses for local notifications, and connected events that only
//! listen to a host event source while they have local listeners.
pub mod arity;
pub mod bus;
pub mod connected;
pub mod ending;
pub mod error;
pub mod listener;
pub mod listener_set;
pub mod runnable;

pub use arity::{Event, Event1, Event2, Event3, Event4, Event5};
pub use bus::{BusHooks, EventBus, NoHooks};
pub use connected::{Bridge, ConnectedEvent, Fanout};
pub use ending::{DetachedEnding, EndingRegistry, HostCallback};
pub use error::EventError;
pub use listener::{Listener, ListenerHandle, ListenerResult};
pub use listener_set::ListenerSet;
pub use runnable::{RunnableEvent, RunnableHandle};
