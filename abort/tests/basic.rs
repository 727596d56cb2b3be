use ankurah_abort::*;
mod common;
use common::{change_watcher, init_tracing};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

#[test]
fn test_timeout_scenario() {
    init_tracing();
    let controller = Controller::<String>::new();
    let signal = controller.signal();
    assert!(!signal.is_aborted());
    assert_eq!(signal.reason(), None);

    let (watcher, check) = change_watcher();
    let handle = signal.subscribe(watcher("cb"));

    controller.trigger("timeout".to_string()).unwrap();
    assert_eq!(check(), [("cb", "timeout".to_string())]);
    assert!(signal.is_aborted());
    assert_eq!(signal.reason().map(String::as_str), Some("timeout"));

    // unsubscribing after the fact is silent and changes nothing
    handle.unsubscribe();
    handle.unsubscribe();
    assert!(check().is_empty());

    controller.trigger("other".to_string()).unwrap();
    assert_eq!(signal.reason().map(String::as_str), Some("timeout"));
    assert!(check().is_empty());
}

#[test]
fn test_listeners_fire_in_subscription_order() {
    let controller = Controller::<u32>::new();
    let signal = controller.signal();
    let sequence = Arc::new(Mutex::new(Vec::new()));

    let _subs: Vec<Subscription> = (1..=3)
        .map(|n| {
            let sequence = sequence.clone();
            signal.subscribe(move |_: &u32| sequence.lock().unwrap().push(n))
        })
        .collect();

    controller.trigger(0).unwrap();
    assert_eq!(*sequence.lock().unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_order_survives_unsubscribe_in_the_middle() {
    let controller = Controller::<u32>::new();
    let signal = controller.signal();
    let (watcher, check) = change_watcher();

    let _a = signal.subscribe(watcher("a"));
    let b = signal.subscribe(watcher("b"));
    let _c = signal.subscribe(watcher("c"));
    b.unsubscribe();
    let _d = signal.subscribe(watcher("d"));
    assert_eq!(signal.subscriber_count(), 3);

    controller.trigger(5).unwrap();
    assert_eq!(check(), [("a", 5), ("c", 5), ("d", 5)]);
}

#[test]
fn test_exactly_once_dispatch() {
    let controller = Controller::<u32>::new();
    let signal = controller.signal();
    let count = Arc::new(AtomicUsize::new(0));

    let _subs: Vec<Subscription> = (0..10)
        .map(|_| {
            let count = count.clone();
            signal.subscribe(move |_: &u32| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    controller.trigger(1).unwrap();
    controller.trigger(2).unwrap();
    controller.trigger(3).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 10);
    assert_eq!(signal.subscriber_count(), 0);
}

#[test]
fn test_late_listener_is_ignored() {
    let controller = Controller::<u32>::new();
    let signal = controller.signal();
    controller.trigger(7).unwrap();

    let (watcher, check) = change_watcher();
    let late = signal.subscribe(watcher("late"));
    assert!(late.is_inert());
    assert_eq!(signal.subscriber_count(), 0);
    late.unsubscribe();

    controller.trigger(8).unwrap();
    assert!(check().is_empty());
}

#[test]
fn test_subscribe_then_unsubscribe_never_fires() {
    let controller = Controller::<u32>::new();
    let signal = controller.signal();
    let (watcher, check) = change_watcher();

    let handle = signal.subscribe(watcher("gone"));
    handle.unsubscribe();
    assert_eq!(signal.subscriber_count(), 0);

    controller.trigger(1).unwrap();
    assert!(check().is_empty());
}

#[test]
fn test_monotonic_state() {
    let controller = Controller::<u32>::new();
    let signal = controller.signal();
    let mut observed = vec![signal.is_aborted()];
    for n in 0..5 {
        controller.trigger(n).unwrap();
        observed.push(signal.is_aborted());
        let _ = signal.subscribe(|_: &u32| {});
        observed.push(signal.is_aborted());
    }
    assert!(!observed[0]);
    assert!(observed[1..].iter().all(|aborted| *aborted));
    assert_eq!(signal.reason(), Some(&0));
}

#[test]
fn test_clones_share_state() {
    let controller = Controller::<u32>::new();
    let a = controller.signal();
    let b = a.clone();
    assert!(a.ptr_eq(&b));
    assert!(a.ptr_eq(&controller.signal()));

    let _sub = b.subscribe(|_: &u32| {});
    assert_eq!(a.subscriber_count(), 1);
    controller.trigger(3).unwrap();
    assert_eq!(b.reason(), Some(&3));
    assert_eq!(a.check(), Err(Aborted(3)));
}

#[test]
fn test_guard_unsubscribes_on_drop() {
    let controller = Controller::<u32>::new();
    let signal = controller.signal();
    let (watcher, check) = change_watcher();

    {
        let _guard = signal.subscribe(watcher("scoped")).guard();
        assert_eq!(signal.subscriber_count(), 1);
    }
    assert_eq!(signal.subscriber_count(), 0);

    let _kept = signal.subscribe(watcher("kept"));
    controller.trigger(4).unwrap();
    assert_eq!(check(), [("kept", 4)]);
}

#[test]
fn test_handle_outlives_signal() {
    let handle = {
        let controller = Controller::<u32>::new();
        let signal = controller.signal();
        signal.subscribe(|_: &u32| {})
    };
    // the registry is gone; unsubscribing is still silent
    handle.unsubscribe();
}

#[test]
fn test_channel_listener() {
    let controller = Controller::<String>::new();
    let signal = controller.signal();
    let (tx, rx) = std::sync::mpsc::channel();

    let _sub = signal.subscribe(tx);
    controller.trigger("closed".to_string()).unwrap();

    assert_eq!(rx.try_recv().unwrap(), "closed");
    // the sender was consumed by the dispatch
    assert!(rx.try_recv().is_err());
}

#[cfg(feature = "tokio")]
#[test]
fn test_tokio_channel_listener() {
    let controller = Controller::<String>::new();
    let signal = controller.signal();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let _sub = signal.subscribe(tx);
    controller.trigger("closed".to_string()).unwrap();

    assert_eq!(rx.try_recv().unwrap(), "closed");
    // the sender was dropped after delivering
    assert!(rx.try_recv().is_err());
}
