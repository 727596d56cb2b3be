use std::convert::Infallible;
use std::sync::Arc;

use tracing::debug;

use crate::{
    error::SubscribeError,
    listener::Listener,
    signal::{Inner, Signal},
    subscription::Subscription,
    traits::AbortSignal,
};

impl<R> Signal<R>
where R: Clone + Send + Sync + 'static
{
    /// A signal that aborts as soon as any of `signals` aborts, with that reason.
    ///
    /// If one of the inputs is already aborted the result is an aborted sentinel
    /// and no input is subscribed. With no inputs the result never aborts.
    /// Once the composite fires it stops listening to every other input.
    ///
    /// Panics from the composite's own listeners are re-raised inside the input's
    /// listener so they reach the input's `trigger` caller. That second panic goes
    /// through the global panic hook too, so each one shows up twice on stderr
    /// with the default hook.
    pub fn any(signals: &[Signal<R>]) -> Signal<R> {
        match compose(signals.iter(), |signal, listener| Ok::<_, Infallible>(signal.subscribe(listener))) {
            Ok(signal) => signal,
            Err(never) => match never {},
        }
    }
}

/// [`Signal::any`] over arbitrary [`AbortSignal`] sources.
///
/// If an input refuses the subscription, every subscription made so far is
/// released before the error is returned.
pub fn any<R, I, S>(inputs: I) -> Result<Signal<R>, SubscribeError>
where
    R: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = S>,
    S: AbortSignal<R>,
{
    compose(inputs, |input, listener| input.listen(listener))
}

fn compose<R, I, S, E, F>(inputs: I, listen: F) -> Result<Signal<R>, E>
where
    R: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = S>,
    S: AbortSignal<R>,
    F: Fn(&S, Listener<R>) -> Result<Subscription, E>,
{
    let inputs: Vec<S> = inputs.into_iter().collect();

    // Short-circuit on an input that already aborted
    if let Some(reason) = inputs.iter().find_map(|input| input.reason()) {
        debug!("composite of {} input(s) constructed already aborted", inputs.len());
        return Ok(Signal::aborted(reason));
    }
    if inputs.is_empty() {
        return Ok(Signal::never());
    }

    let inner = Arc::new(Inner::new());
    let mut upstream = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let weak = Arc::downgrade(&inner);
        let forward: Listener<R> = Box::new(move |reason: &R| {
            let Some(inner) = weak.upgrade() else { return };
            if !inner.is_aborted() {
                debug!("composite firing from upstream abort");
            }
            if let Err(failures) = inner.abort(reason.clone()) {
                // Re-raised so the caller of the upstream trigger sees them.
                std::panic::panic_any(failures);
            }
        });
        match listen(input, forward) {
            Ok(subscription) => upstream.push(subscription),
            Err(err) => {
                for subscription in &upstream {
                    subscription.unsubscribe();
                }
                return Err(err);
            }
        }
    }
    inner.adopt_upstream(upstream);

    // An input may have aborted between the pre-check and its subscription
    if let Some(reason) = inputs.iter().find_map(|input| input.reason()) {
        debug!("composite input aborted during construction");
        // `inner` is not shared yet, so it has no listeners that could fail
        let dispatched = inner.abort(reason);
        debug_assert!(dispatched.is_ok(), "unshared composite reported listener failures");
    }

    debug!("composite subscribed to {} input(s)", inputs.len());
    Ok(Signal::live(inner))
}
