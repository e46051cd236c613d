// Full runs against the in-process host

use parking_lot::Mutex;
use scriptbus_events::ListenerResult;
use scriptbus_runner::{
    execute, scripts::EndingLogger, HostListening, LocalHost, RunnerConfig, Script, ScriptConfig,
    ScriptOverrides, Session, Waiter,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Ends the host run after a fixed number of waits, like a user stopping the
/// script from another thread
struct EndAfter {
    host: Arc<LocalHost>,
    remaining: AtomicU32,
}

impl EndAfter {
    fn new(host: &Arc<LocalHost>, waits: u32) -> Self {
        Self {
            host: host.clone(),
            remaining: AtomicU32::new(waits),
        }
    }
}

impl Waiter for EndAfter {
    fn wait(&self, _duration: Duration) {
        if self.remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.host.end_run();
        }
    }
}

#[test]
fn test_host_ending_stops_loop_and_fires_on_ending() {
    let host = LocalHost::new();
    let session = Session::new(host.clone());
    let mut script = EndingLogger::new();
    let waiter = EndAfter::new(&host, 3);

    let loops = execute(&mut script, &session, &waiter, "", Duration::ZERO).unwrap();

    assert_eq!(loops, 3);
    assert_eq!(script.loops(), 3);
    assert_eq!(script.endings_seen(), 1);
    assert!(!session.is_running());
    // The on_ending bridge detached itself from the host
    assert_eq!(host.pre_ending_count(), 0);
    assert!(!session.on_ending().is_connected());
}

#[test]
fn test_script_stopping_itself_then_host_ending() {
    let host = LocalHost::new();
    let session = Session::new(host.clone());
    let mut script = EndingLogger::new().with_max_loops(2);
    let waiter = EndAfter::new(&host, u32::MAX);

    let loops = execute(&mut script, &session, &waiter, "", Duration::ZERO).unwrap();
    assert_eq!(loops, 2);
    assert_eq!(script.endings_seen(), 0);

    assert!(host.end_run());
    assert_eq!(script.endings_seen(), 1);
}

#[test]
fn test_session_reused_for_second_run() {
    let host = LocalHost::new();
    let session = Session::new(host.clone());
    let mut script = EndingLogger::new();

    execute(&mut script, &session, &EndAfter::new(&host, 1), "", Duration::ZERO).unwrap();
    assert_eq!(script.endings_seen(), 1);

    host.begin_run();
    let loops = execute(&mut script, &session, &EndAfter::new(&host, 2), "", Duration::ZERO).unwrap();

    assert_eq!(loops, 2);
    assert_eq!(script.endings_seen(), 2);
    assert_eq!(session.on_ending().len(), 1);
    // One stop hook from the session plus one teardown hook from on_ending
    assert_eq!(host.ending_count(), 2);
}

#[test]
fn test_on_ending_listeners_kept_across_runs_all_fire() {
    let host = LocalHost::new();
    let session = Session::new(host.clone());
    let hits = Arc::new(AtomicU32::new(0));

    let add_counter = || {
        let hits = hits.clone();
        session.on_ending().add_fn(move || -> ListenerResult {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    };

    session.start();
    add_counter();
    host.end_run();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!session.on_ending().is_connected());

    // Second run adds another listener without removing the first
    host.begin_run();
    session.start();
    add_counter();
    assert!(session.on_ending().is_connected());
    assert_eq!(host.pre_ending_count(), 1);

    host.end_run();
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(host.pre_ending_count(), 0);
}

#[test]
fn test_script_that_never_removes_its_listener_runs_twice() {
    struct AddsEveryStart {
        endings: Arc<AtomicU32>,
    }

    impl Script for AddsEveryStart {
        fn name(&self) -> &'static str {
            "adds every start"
        }

        fn on_start(&mut self, session: &Arc<Session>, _args: &str) -> anyhow::Result<()> {
            let endings = self.endings.clone();
            session.on_ending().add_fn(move || {
                endings.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            Ok(())
        }

        fn on_loop(&mut self, _session: &Arc<Session>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    let host = LocalHost::new();
    let session = Session::new(host.clone());
    let endings = Arc::new(AtomicU32::new(0));
    let mut script = AddsEveryStart {
        endings: endings.clone(),
    };

    execute(&mut script, &session, &EndAfter::new(&host, 1), "", Duration::ZERO).unwrap();
    assert_eq!(endings.load(Ordering::SeqCst), 1);

    host.begin_run();
    execute(&mut script, &session, &EndAfter::new(&host, 1), "", Duration::ZERO).unwrap();

    // Both registrations are live at the end of the second run
    assert_eq!(session.on_ending().len(), 2);
    assert_eq!(endings.load(Ordering::SeqCst), 3);
}

#[test]
fn test_ending_listeners_run_in_order_while_still_running() {
    let host = LocalHost::new();
    let session = Session::new(host.clone());
    session.start();

    let log = Arc::new(Mutex::new(Vec::new()));
    for name in ["first", "second"] {
        let log = log.clone();
        let observer = session.clone();
        session.on_ending().add_fn(move || -> ListenerResult {
            log.lock().push((name, observer.is_running()));
            Ok(())
        });
    }

    host.end_run();
    assert_eq!(*log.lock(), vec![("first", true), ("second", true)]);
    assert!(!session.is_running());
}

#[test]
fn test_config_overrides_script_preferences() {
    struct QuietScript;

    impl Script for QuietScript {
        fn name(&self) -> &'static str {
            "quiet"
        }

        fn on_start(&mut self, _session: &Arc<Session>, _args: &str) -> anyhow::Result<()> {
            Ok(())
        }

        fn on_loop(&mut self, session: &Arc<Session>) -> anyhow::Result<()> {
            session.stop();
            Ok(())
        }

        fn break_handler_enabled(&self) -> bool {
            false
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let config = RunnerConfig {
        loop_interval_ms: 20,
        file_logging: false,
        script: ScriptOverrides {
            login_handler_enabled: Some(false),
            break_handler_enabled: None,
        },
    };
    config.save_to(&path).unwrap();
    let loaded = RunnerConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);

    let mut script_config = ScriptConfig::default();
    QuietScript.configure(&mut script_config);
    loaded.script.apply(&mut script_config);
    assert!(!script_config.login_handler_enabled);
    assert!(!script_config.break_handler_enabled);
}

#[test]
fn test_stop_from_another_thread() {
    struct Spin;

    impl Script for Spin {
        fn name(&self) -> &'static str {
            "spin"
        }

        fn on_start(&mut self, _session: &Arc<Session>, _args: &str) -> anyhow::Result<()> {
            Ok(())
        }

        fn on_loop(&mut self, _session: &Arc<Session>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct Sleep;

    impl Waiter for Sleep {
        fn wait(&self, duration: Duration) {
            std::thread::sleep(duration);
        }
    }

    let host = LocalHost::new();
    let session = Session::new(host.clone());
    let runner = {
        let session = session.clone();
        std::thread::spawn(move || {
            execute(&mut Spin, &session, &Sleep, "", Duration::from_millis(1))
        })
    };

    while !session.is_running() {
        std::thread::yield_now();
    }
    host.end_run();

    let loops = runner.join().unwrap().unwrap();
    assert!(loops >= 1);
    assert!(!session.is_running());
    assert_eq!(host.pre_ending_count(), 0);
}

#[test]
fn test_pre_ending_removal_is_by_identity() {
    let host = LocalHost::new();
    let callback: scriptbus_events::HostCallback = Arc::new(|| -> ListenerResult { Ok(()) });
    host.add_pre_ending_listener(callback.clone());
    host.remove_pre_ending_listener(&callback);
    assert_eq!(host.pre_ending_count(), 0);
}
