use std::sync::Arc;

use crate::{error::DispatchError, signal::Inner, signal::Signal};

/// The sole authority over one [`Signal`].
///
/// Hand out [`Controller::signal`] to consumers and keep the controller with
/// whatever decides when to cancel. Dropping the controller never aborts the
/// signal; it simply becomes a signal that will never fire.
pub struct Controller<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Default for Controller<R>
where R: Send + Sync + 'static
{
    fn default() -> Self { Self::new() }
}

impl<R> Controller<R>
where R: Send + Sync + 'static
{
    pub fn new() -> Self { Self { inner: Arc::new(Inner::new()) } }

    /// Read-only signal owned by this controller
    pub fn signal(&self) -> Signal<R> { Signal::live(self.inner.clone()) }

    pub fn is_aborted(&self) -> bool { self.inner.is_aborted() }

    /// Abort the signal with `reason`.
    ///
    /// The first call fixes the reason and synchronously runs every listener
    /// registered at that instant, in subscription order, before returning.
    /// Later calls do nothing. A panicking listener does not stop the others;
    /// all panics from the pass are returned together.
    pub fn trigger(&self, reason: R) -> Result<(), DispatchError> { self.inner.abort(reason) }
}

impl<R> Controller<R>
where R: Default + Send + Sync + 'static
{
    /// Abort with `R::default()` as the reason
    pub fn abort(&self) -> Result<(), DispatchError> { self.trigger(R::default()) }
}

impl<R> std::fmt::Debug for Controller<R>
where R: Send + Sync + 'static
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("Controller").field("aborted", &self.is_aborted()).finish() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_trigger_is_idempotent() {
        let controller = Controller::<String>::new();
        let signal = controller.signal();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let _sub = {
            let calls = calls.clone();
            signal.subscribe(move |reason: &String| calls.lock().unwrap().push(reason.clone()))
        };

        controller.trigger("first".to_string()).unwrap();
        controller.trigger("second".to_string()).unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["first".to_string()]);
        assert_eq!(signal.reason().map(String::as_str), Some("first"));
        assert!(controller.is_aborted());
    }

    #[test]
    fn test_abort_uses_default_reason() {
        let controller = Controller::<String>::new();
        controller.abort().unwrap();
        assert_eq!(controller.signal().reason().map(String::as_str), Some(""));
    }

    #[test]
    fn test_dropping_controller_does_not_abort() {
        let controller = Controller::<u32>::new();
        let signal = controller.signal();
        let fired = Arc::new(Mutex::new(false));
        let sub = {
            let fired = fired.clone();
            signal.subscribe(move |_: &u32| *fired.lock().unwrap() = true)
        };
        drop(controller);
        assert!(!signal.is_aborted());
        assert!(!*fired.lock().unwrap());
        assert_eq!(signal.reason(), None);
        sub.unsubscribe();
        assert_eq!(signal.subscriber_count(), 0);
    }
}
