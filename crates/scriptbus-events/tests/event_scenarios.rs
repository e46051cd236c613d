// End-to-end scenarios for local and host-bridged events

use parking_lot::Mutex;
use scriptbus_events::{
    ConnectedEvent, EndingRegistry, Event2, EventBus, Fanout, HostCallback, Listener,
    ListenerHandle, ListenerResult, RunnableEvent,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Minimal host: one notification source plus an ending registry
#[derive(Default)]
struct FakeHost {
    source: Mutex<Vec<HostCallback>>,
    ending: Mutex<Vec<HostCallback>>,
}

impl FakeHost {
    fn emit(&self) -> ListenerResult {
        let callbacks = self.source.lock().clone();
        for callback in callbacks {
            callback()?;
        }
        Ok(())
    }

    fn end_run(&self) {
        let callbacks = self.ending.lock().clone();
        for callback in callbacks {
            callback().unwrap();
        }
    }

    fn source_len(&self) -> usize {
        self.source.lock().len()
    }
}

impl EndingRegistry for FakeHost {
    fn add_ending_listener(&self, callback: HostCallback) {
        self.ending.lock().push(callback);
    }
}

fn bridged(host: &Arc<FakeHost>) -> RunnableEvent {
    let on_add = host.clone();
    let on_remove = host.clone();
    RunnableEvent::new(
        host.clone(),
        move |callback| on_add.source.lock().push(callback),
        move |callback| {
            on_remove
                .source
                .lock()
                .retain(|existing| !Arc::ptr_eq(existing, &callback));
        },
    )
}

#[test]
fn test_host_source_only_listened_to_while_listeners_exist() {
    let host = Arc::new(FakeHost::default());
    let event = bridged(&host);
    assert_eq!(host.source_len(), 0);

    let a = event.add_fn(|| Ok(()));
    let b = event.add_fn(|| Ok(()));
    assert_eq!(host.source_len(), 1);

    event.remove(&a);
    assert_eq!(host.source_len(), 1);
    event.remove(&b);
    assert_eq!(host.source_len(), 0);
}

#[test]
fn test_host_emission_reaches_local_listeners_in_order() {
    let host = Arc::new(FakeHost::default());
    let event = bridged(&host);
    let order = Arc::new(Mutex::new(Vec::new()));

    for id in 0..4 {
        let order = order.clone();
        event.add_fn(move || {
            order.lock().push(id);
            Ok(())
        });
    }

    host.emit().unwrap();
    host.emit().unwrap();
    assert_eq!(*order.lock(), vec![0, 1, 2, 3, 0, 1, 2, 3]);
}

#[test]
fn test_end_of_run_detaches_bridge_and_next_run_reconnects() {
    let host = Arc::new(FakeHost::default());
    let event = bridged(&host);
    let hits = Arc::new(AtomicU32::new(0));

    let counter = hits.clone();
    let handle = event.add_fn(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    host.end_run();
    assert_eq!(host.source_len(), 0);
    assert!(!event.is_connected());

    // Nothing reaches the old listener once the bridge is gone
    host.emit().unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    // Emptying and refilling the event attaches the same adapter again
    event.remove(&handle);
    event.add(handle.clone());
    assert_eq!(host.source_len(), 1);
    assert!(Arc::ptr_eq(&host.source.lock()[0], event.adapter()));
    host.emit().unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_listener_error_surfaces_to_host() {
    let host = Arc::new(FakeHost::default());
    let event = bridged(&host);
    let later = Arc::new(AtomicU32::new(0));

    event.add_fn(|| anyhow::bail!("listener one failed"));
    for _ in 0..2 {
        let later = later.clone();
        event.add_fn(move || {
            later.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    }

    let err = host.emit().unwrap_err();
    assert!(format!("{:#}", err).contains("listener one failed"));
    assert_eq!(later.load(Ordering::SeqCst), 0);
}

#[test]
fn test_two_argument_event_scenario() {
    let event: Event2<i32, String> = Event2::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for id in ["a", "b"] {
        let seen = seen.clone();
        event.add_fn(move |n, s| {
            seen.lock().push(format!("{}:{}:{}", id, n, s));
            Ok(())
        });
    }

    event.invoke(5, "x".to_string()).unwrap();
    assert_eq!(*seen.lock(), vec!["a:5:x", "b:5:x"]);
}

#[test]
fn test_generic_connected_event_with_custom_adapter() {
    type Local = dyn Listener<(String,)>;
    type HostListener = Arc<dyn Fn(&str) -> ListenerResult + Send + Sync>;

    let host = Arc::new(FakeHost::default());
    let registered: Arc<Mutex<Vec<HostListener>>> = Arc::new(Mutex::new(Vec::new()));
    let on_add = registered.clone();
    let on_remove = registered.clone();

    let event: ConnectedEvent<Local, HostListener> = ConnectedEvent::new(
        host.clone(),
        move |listener| on_add.lock().push(listener),
        move |listener| {
            on_remove
                .lock()
                .retain(|existing| !Arc::ptr_eq(existing, &listener))
        },
        |fanout: Fanout<Local>| -> HostListener {
            Arc::new(move |message: &str| -> ListenerResult {
                fanout.for_each_as_argument(|listener| listener.on_event((message.to_string(),)))?;
                Ok(())
            })
        },
    );

    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let handle: ListenerHandle<(String,)> = Arc::new(move |message: String| -> ListenerResult {
        sink.lock().push(message);
        Ok(())
    });
    event.add(handle.clone());

    let adapter = registered.lock()[0].clone();
    adapter("hello").unwrap();
    assert_eq!(*log.lock(), vec!["hello".to_string()]);

    event.remove(&handle);
    assert!(registered.lock().is_empty());
}

#[test]
fn test_plain_bus_add_remove_cycle() {
    let bus = EventBus::<dyn Listener<()>>::new();
    let handle = bus.add(Arc::new(|| -> ListenerResult { Ok(()) }));
    assert!(bus.contains(&handle));
    bus.remove(&handle);
    assert!(bus.is_empty());
}
