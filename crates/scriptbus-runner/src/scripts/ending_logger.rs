use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use scriptbus_events::RunnableHandle;

use crate::script::Script;
use crate::session::Session;

/// Example script that logs when its run is ending
#[derive(Default)]
pub struct EndingLogger {
    loops: u64,
    max_loops: Option<u64>,
    ending_listener: Option<RunnableHandle>,
    endings_seen: Arc<AtomicU32>,
}

impl EndingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the session after `max_loops` iterations
    pub fn with_max_loops(mut self, max_loops: u64) -> Self {
        self.max_loops = Some(max_loops);
        self
    }

    pub fn loops(&self) -> u64 {
        self.loops
    }

    /// How many times the ending listener has fired
    pub fn endings_seen(&self) -> u32 {
        self.endings_seen.load(Ordering::Acquire)
    }
}

impl Script for EndingLogger {
    fn name(&self) -> &'static str {
        "Ending Logger"
    }

    fn on_start(&mut self, session: &Arc<Session>, args: &str) -> anyhow::Result<()> {
        info!(target: "scripts", "EndingLogger started with args {:?}", args);
        self.loops = 0;

        // Restarting on the same session: drop the listener from the last run
        if let Some(previous) = self.ending_listener.take() {
            session.on_ending().remove(&previous);
        }

        let endings_seen = self.endings_seen.clone();
        let handle = session.on_ending().add_fn(move || {
            info!(target: "scripts", "Script ending!");
            endings_seen.fetch_add(1, Ordering::AcqRel);
            Ok(())
        });
        self.ending_listener = Some(handle);
        Ok(())
    }

    fn on_loop(&mut self, session: &Arc<Session>) -> anyhow::Result<()> {
        self.loops += 1;
        debug!(target: "scripts", "EndingLogger loop {}", self.loops);

        if self.max_loops.is_some_and(|max| self.loops >= max) {
            info!(target: "scripts", "EndingLogger reached {} loops, stopping", self.loops);
            session.stop();
        }
        Ok(())
    }
}
