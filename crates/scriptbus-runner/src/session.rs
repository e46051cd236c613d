use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use scriptbus_events::{ConnectedEvent, Fanout, ListenerResult, RunnableEvent};

use crate::host::{EndingRegistry, HostListening};

/// Run state of one script session.
///
/// Shared as `Arc<Session>` between the run loop, the script and host
/// callbacks. `stop` may be called from any thread; the loop notices it at the
/// next iteration.
pub struct Session {
    running: AtomicBool,
    ending_hooked: AtomicBool,
    host: Arc<dyn HostListening>,
    ending: Arc<dyn EndingRegistry>,
    on_ending: RunnableEvent,
}

impl Session {
    pub fn new<H>(host: Arc<H>) -> Arc<Self>
    where
        H: HostListening + 'static,
    {
        let on_add = host.clone();
        let on_remove = host.clone();
        let on_ending = RunnableEvent::new(
            host.clone(),
            move |callback| on_add.add_pre_ending_listener(callback),
            move |callback| on_remove.remove_pre_ending_listener(&callback),
        );

        Arc::new(Self {
            running: AtomicBool::new(false),
            ending_hooked: AtomicBool::new(false),
            // Same host, kept as both trait objects so no upcast is needed
            host: host.clone(),
            ending: host,
            on_ending,
        })
    }

    /// Mark the session running.
    ///
    /// The first call also asks the host to stop this session when the run
    /// ends. Later calls only set the flag again.
    pub fn start(self: &Arc<Self>) {
        if !self.ending_hooked.swap(true, Ordering::AcqRel) {
            let session = Arc::downgrade(self);
            self.host.add_ending_listener(Arc::new(move || -> ListenerResult {
                if let Some(session) = session.upgrade() {
                    session.stop();
                }
                Ok(())
            }));
            debug!(target: "session", "Registered run ending hook");
        }

        self.running.store(true, Ordering::Release);
        info!(target: "session", "Session started");
    }

    pub fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            info!(target: "session", "Session stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Fired just before the host ends the run
    pub fn on_ending(&self) -> &RunnableEvent {
        &self.on_ending
    }

    /// The registry connected events use to detach at the end of the run
    pub fn ending_registry(&self) -> Arc<dyn EndingRegistry> {
        self.ending.clone()
    }

    /// Build a connected event that detaches from its host source when this
    /// session's run ends
    pub fn connected_event<L, T, C, D, F>(
        &self,
        connector: C,
        disconnector: D,
        adapter_factory: F,
    ) -> ConnectedEvent<L, T>
    where
        L: ?Sized + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
        C: Fn(T) + Send + Sync + 'static,
        D: Fn(T) + Send + Sync + 'static,
        F: Fn(Fanout<L>) -> T + Send + Sync + 'static,
    {
        ConnectedEvent::new(self.ending_registry(), connector, disconnector, adapter_factory)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("running", &self.is_running())
            .field("on_ending", &self.on_ending)
            .finish()
    }
}
