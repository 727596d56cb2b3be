use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::{
    error::{BoxError, SubscribeError},
    listener::Listener,
    subscription::Subscription,
    traits::AbortSignal,
};

/// An event-based cancellation object from some other host library.
///
/// These typically expose add/remove-listener methods plus an aborted flag and
/// reason. Implement this trait for the host type and wrap it with [`bridge`]
/// to use it anywhere an [`AbortSignal`] is expected.
pub trait EventTarget: Send + Sync + 'static {
    type Reason: Clone + Send + Sync + 'static;
    /// Whatever the host returns to identify a registered listener
    type Token: Send + 'static;

    fn is_aborted(&self) -> bool;
    fn reason(&self) -> Option<Self::Reason>;
    fn add_listener(&self, listener: Box<dyn Fn(&Self::Reason) + Send + Sync>) -> Result<Self::Token, BoxError>;
    fn remove_listener(&self, token: Self::Token);
}

/// An [`EventTarget`] adapted to the [`AbortSignal`] surface
pub struct Bridged<T>(Arc<T>);

impl<T> Clone for Bridged<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

/// Adapt a host cancellation object into an [`AbortSignal`]
pub fn bridge<T: EventTarget>(target: T) -> Bridged<T> { Bridged(Arc::new(target)) }

impl<T: EventTarget> Bridged<T> {
    pub fn target(&self) -> &T { &self.0 }
}

impl<T: EventTarget> AbortSignal<T::Reason> for Bridged<T> {
    fn is_aborted(&self) -> bool { self.0.is_aborted() }

    fn reason(&self) -> Option<T::Reason> { self.0.reason() }

    fn listen(&self, listener: Listener<T::Reason>) -> Result<Subscription, SubscribeError> {
        if self.0.is_aborted() {
            trace!("ignoring late listener on bridged target");
            return Ok(Subscription::inert());
        }

        // Hosts may fire a listener more than once; ours runs at most once
        let pending = Mutex::new(Some(listener));
        let token = self
            .0
            .add_listener(Box::new(move |reason: &T::Reason| {
                let listener = pending.lock().expect("bridged listener lock is poisoned").take();
                if let Some(listener) = listener {
                    listener(reason);
                }
            }))
            .map_err(SubscribeError)?;

        let target = Arc::downgrade(&self.0);
        Ok(Subscription::from_release(move || {
            if let Some(target) = target.upgrade() {
                target.remove_listener(token);
            }
        }))
    }
}
