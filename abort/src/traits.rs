use crate::{
    error::{Aborted, SubscribeError},
    listener::Listener,
    subscription::Subscription,
};

/// The consumption surface of an abort signal.
///
/// Anything implementing this trait can be handed to consumers and used as a
/// composite input, whatever produced it. Implementations must uphold:
/// - `is_aborted` never goes back to `false`, and `reason` is fixed once set
/// - a listener registered before the abort is invoked exactly once, in registration order
/// - `listen` on an aborted source drops the listener uncalled and returns an inert handle
pub trait AbortSignal<R>: Send + Sync {
    fn is_aborted(&self) -> bool;

    /// The abort reason, or `None` while not aborted
    fn reason(&self) -> Option<R>;

    /// Register a listener for the abort transition
    fn listen(&self, listener: Listener<R>) -> Result<Subscription, SubscribeError>;

    /// `Err(Aborted(reason))` once aborted
    fn check(&self) -> Result<(), Aborted<R>> {
        match self.reason() {
            Some(reason) => Err(Aborted(reason)),
            None => Ok(()),
        }
    }
}

impl<R, S> AbortSignal<R> for &S
where S: AbortSignal<R> + ?Sized
{
    fn is_aborted(&self) -> bool { (**self).is_aborted() }
    fn reason(&self) -> Option<R> { (**self).reason() }
    fn listen(&self, listener: Listener<R>) -> Result<Subscription, SubscribeError> { (**self).listen(listener) }
}

impl<R, S> AbortSignal<R> for std::sync::Arc<S>
where S: AbortSignal<R> + ?Sized
{
    fn is_aborted(&self) -> bool { (**self).is_aborted() }
    fn reason(&self) -> Option<R> { (**self).reason() }
    fn listen(&self, listener: Listener<R>) -> Result<Subscription, SubscribeError> { (**self).listen(listener) }
}
