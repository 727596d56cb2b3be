use std::sync::{Arc, Mutex};

#[allow(unused)]
pub fn init_tracing() { let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::TRACE).try_init(); }

/// Returns a listener factory that records `(label, reason)` pairs, and a
/// function that drains what has been recorded so far.
#[allow(unused)]
pub fn change_watcher<T: Clone + Send + 'static>()
-> (impl Fn(&'static str) -> Box<dyn FnOnce(&T) + Send> + Clone, impl Fn() -> Vec<(&'static str, T)>) {
    let changes = Arc::new(Mutex::new(Vec::new()));
    let watcher = {
        let changes = changes.clone();
        move |label: &'static str| -> Box<dyn FnOnce(&T) + Send> {
            let changes = changes.clone();
            Box::new(move |value: &T| changes.lock().unwrap().push((label, value.clone())))
        }
    };

    let check = move || changes.lock().unwrap().drain(..).collect::<Vec<_>>();

    (watcher, check)
}
