//! Session control and the script run loop, on top of `scriptbus-events`.

pub mod config;
pub mod host;
mod local_host;
pub mod logging;
mod script;
pub mod scripts;
mod session;

pub use config::{ConfigError, ProjectPaths, RunnerConfig, ScriptOverrides};
pub use host::{HostListening, ScriptConfig, ThreadWaiter, Waiter};
pub use local_host::LocalHost;
pub use logging::init_logging;
pub use script::{execute, RunError, Script, DEFAULT_LOOP_INTERVAL};
pub use session::Session;
