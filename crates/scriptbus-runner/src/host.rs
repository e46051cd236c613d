//! Interfaces to the host automation environment.

use std::time::Duration;

pub use scriptbus_events::{EndingRegistry, HostCallback};

/// Run lifecycle notifications provided by the host.
///
/// Pre-ending listeners run first when a run is terminating, then ending
/// listeners. Each fires once per run.
pub trait HostListening: EndingRegistry {
    fn add_pre_ending_listener(&self, callback: HostCallback);

    /// Remove a callback previously passed to `add_pre_ending_listener`,
    /// matched by pointer
    fn remove_pre_ending_listener(&self, callback: &HostCallback);
}

/// Blocking wait used between run loop iterations
pub trait Waiter: Send + Sync {
    fn wait(&self, duration: Duration);
}

/// Waits by sleeping the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadWaiter;

impl Waiter for ThreadWaiter {
    fn wait(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Per-script switches the host reads after `Script::configure`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptConfig {
    /// Let the host handle random events and re-login
    pub login_handler_enabled: bool,
    /// Let the host take scheduled breaks
    pub break_handler_enabled: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            login_handler_enabled: true,
            break_handler_enabled: true,
        }
    }
}
