use std::sync::Arc;

use crate::listener::ListenerResult;

/// Callback shape the host uses for its own notifications
pub type HostCallback = Arc<dyn Fn() -> ListenerResult + Send + Sync>;

/// Host notification fired once when the current run is ending.
///
/// Connected events register here on their first connect so their host
/// adapter is always detached at the end of a run.
pub trait EndingRegistry: Send + Sync {
    fn add_ending_listener(&self, callback: HostCallback);
}

/// Registry that drops every callback, for events that are never bridged to
/// a host source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedEnding;

impl EndingRegistry for DetachedEnding {
    fn add_ending_listener(&self, _callback: HostCallback) {}
}
