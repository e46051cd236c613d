use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::host::{ScriptConfig, Waiter};
use crate::session::Session;

/// Pause between loop iterations unless configured otherwise
pub const DEFAULT_LOOP_INTERVAL: Duration = Duration::from_millis(100);

/// A user script driven by [`execute`]
pub trait Script: Send {
    /// Human-readable name for this script
    fn name(&self) -> &'static str;

    /// Called once, after the session is started, with the run's argument
    /// string
    fn on_start(&mut self, session: &Arc<Session>, args: &str) -> anyhow::Result<()>;

    /// Called repeatedly while the session is running
    fn on_loop(&mut self, session: &Arc<Session>) -> anyhow::Result<()>;

    /// Whether the host should keep handling random events and re-login
    fn login_handler_enabled(&self) -> bool {
        true
    }

    /// Whether the host should keep taking scheduled breaks
    fn break_handler_enabled(&self) -> bool {
        true
    }

    /// Called by the host before `execute`
    fn configure(&self, config: &mut ScriptConfig) {
        config.login_handler_enabled = self.login_handler_enabled();
        config.break_handler_enabled = self.break_handler_enabled();
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("script {script} failed to start: {source}")]
    Start {
        script: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("script {script} failed on loop {iteration}: {source}")]
    Loop {
        script: &'static str,
        iteration: u64,
        #[source]
        source: anyhow::Error,
    },
}

/// Run `script` until the session stops.
///
/// Starts the session, calls `on_start` once, then alternates `on_loop` and a
/// wait of `interval` while the session is running. The running flag is only
/// checked between iterations. Returns the number of completed loops.
pub fn execute(
    script: &mut dyn Script,
    session: &Arc<Session>,
    waiter: &dyn Waiter,
    args: &str,
    interval: Duration,
) -> Result<u64, RunError> {
    let name = script.name();
    session.start();
    info!(target: "scripts", "Starting script {} (args: {:?})", name, args);

    if let Err(source) = script.on_start(session, args) {
        error!(target: "scripts", "Script {} failed to start: {:#}", name, source);
        session.stop();
        return Err(RunError::Start {
            script: name,
            source,
        });
    }

    let mut iteration = 0;
    while session.is_running() {
        iteration += 1;
        if let Err(source) = script.on_loop(session) {
            error!(target: "scripts", "Script {} failed on loop {}: {:#}", name, iteration, source);
            session.stop();
            return Err(RunError::Loop {
                script: name,
                iteration,
                source,
            });
        }
        debug!(target: "scripts", "Script {} finished loop {}", name, iteration);
        waiter.wait(interval);
    }

    info!(target: "scripts", "Script {} ended after {} loops", name, iteration);
    Ok(iteration)
}
