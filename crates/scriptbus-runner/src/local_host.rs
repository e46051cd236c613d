use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::host::{EndingRegistry, HostCallback, HostListening, ScriptConfig};

/// In-process host used by the command-line runner and tests.
///
/// Registered callbacks live for the whole process, so they are called again
/// at the end of every later run. `end_run` only fires once per run; call
/// `begin_run` before starting the next one.
#[derive(Default)]
pub struct LocalHost {
    pre_ending: Mutex<Vec<HostCallback>>,
    ending: Mutex<Vec<HostCallback>>,
    ended: AtomicBool,
    script_config: Mutex<ScriptConfig>,
}

impl LocalHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Allow `end_run` to fire again
    pub fn begin_run(&self) {
        self.ended.store(false, Ordering::Release);
    }

    /// Signal that the current run is ending.
    ///
    /// Calls pre-ending listeners, then ending listeners, in registration
    /// order. Callback errors are logged and do not stop the others. Returns
    /// false if this run already ended.
    pub fn end_run(&self) -> bool {
        if self.ended.swap(true, Ordering::AcqRel) {
            debug!(target: "session", "Run already ended, ignoring");
            return false;
        }

        info!(target: "session", "Run ending");
        // Snapshots: callbacks may register or unregister while we iterate
        let pre_ending = self.pre_ending.lock().clone();
        Self::notify("pre-ending", &pre_ending);
        let ending = self.ending.lock().clone();
        Self::notify("ending", &ending);
        true
    }

    /// Record the switches for the script about to run.
    ///
    /// This host has no login or break handlers of its own, so the switches
    /// are only kept for inspection.
    pub fn set_script_config(&self, config: ScriptConfig) {
        info!(
            target: "session",
            "Script config: login handler {}, break handler {}",
            config.login_handler_enabled,
            config.break_handler_enabled
        );
        *self.script_config.lock() = config;
    }

    pub fn script_config(&self) -> ScriptConfig {
        *self.script_config.lock()
    }

    pub fn has_ended(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }

    pub fn pre_ending_count(&self) -> usize {
        self.pre_ending.lock().len()
    }

    pub fn ending_count(&self) -> usize {
        self.ending.lock().len()
    }

    fn notify(kind: &str, callbacks: &[HostCallback]) {
        for callback in callbacks {
            if let Err(e) = callback() {
                warn!(target: "session", "{} listener failed: {:#}", kind, e);
            }
        }
    }
}

impl EndingRegistry for LocalHost {
    fn add_ending_listener(&self, callback: HostCallback) {
        self.ending.lock().push(callback);
    }
}

impl HostListening for LocalHost {
    fn add_pre_ending_listener(&self, callback: HostCallback) {
        self.pre_ending.lock().push(callback);
    }

    fn remove_pre_ending_listener(&self, callback: &HostCallback) {
        let mut pre_ending = self.pre_ending.lock();
        if let Some(index) = pre_ending
            .iter()
            .position(|existing| Arc::ptr_eq(existing, callback))
        {
            pre_ending.remove(index);
        }
    }
}

impl std::fmt::Debug for LocalHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalHost")
            .field("pre_ending", &self.pre_ending_count())
            .field("ending", &self.ending_count())
            .field("ended", &self.has_ended())
            .finish()
    }
}
