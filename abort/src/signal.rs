use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use tracing::{debug, trace, warn};

use crate::{
    error::{Aborted, DispatchError, ListenerPanic, SubscribeError},
    listener::{IntoListener, Listener},
    registry::{Registry, SubscriptionId},
    subscription::{Detach, Subscription},
    traits::AbortSignal,
};

/// Read-only view of an abort state.
///
/// A `Signal` cannot abort itself. Live signals come from a [`crate::Controller`]
/// or from [`Signal::any`]; [`Signal::never`] and [`Signal::aborted`] are fixed
/// sentinels with no registry at all. Clones observe the same state.
pub struct Signal<R>(pub(crate) Repr<R>);

pub(crate) enum Repr<R> {
    Never,
    Aborted(Arc<R>),
    Live(Arc<Inner<R>>),
}

impl<R> Clone for Signal<R> {
    fn clone(&self) -> Self {
        Self(match &self.0 {
            Repr::Never => Repr::Never,
            Repr::Aborted(reason) => Repr::Aborted(reason.clone()),
            Repr::Live(inner) => Repr::Live(inner.clone()),
        })
    }
}

impl<R> Signal<R>
where R: Send + Sync + 'static
{
    /// A signal that can never abort. Subscribing to it retains nothing.
    pub fn never() -> Self { Self(Repr::Never) }

    /// A signal that is aborted from the start with `reason`
    pub fn aborted(reason: R) -> Self { Self(Repr::Aborted(Arc::new(reason))) }

    pub(crate) fn live(inner: Arc<Inner<R>>) -> Self { Self(Repr::Live(inner)) }

    pub fn is_aborted(&self) -> bool {
        match &self.0 {
            Repr::Never => false,
            Repr::Aborted(_) => true,
            Repr::Live(inner) => inner.is_aborted(),
        }
    }

    /// The abort reason. `None` until the signal aborts, then fixed forever.
    pub fn reason(&self) -> Option<&R> {
        match &self.0 {
            Repr::Never => None,
            Repr::Aborted(reason) => Some(reason.as_ref()),
            Repr::Live(inner) => inner.reason.get(),
        }
    }

    /// Register `listener` to run once, synchronously, when this signal aborts.
    ///
    /// Listeners run in the order they subscribed. Subscribing after the abort
    /// is a no-op: the listener is dropped without being called and the
    /// returned handle is inert.
    pub fn subscribe<L>(&self, listener: L) -> Subscription
    where L: IntoListener<R> {
        match &self.0 {
            Repr::Never => Subscription::inert(),
            Repr::Aborted(_) => {
                trace!("ignoring late listener on aborted sentinel");
                Subscription::inert()
            }
            Repr::Live(inner) => inner.subscribe(listener.into_listener()),
        }
    }

    /// Number of listeners still waiting for the abort
    pub fn subscriber_count(&self) -> usize {
        match &self.0 {
            Repr::Never | Repr::Aborted(_) => 0,
            Repr::Live(inner) => inner.state().registry.len(),
        }
    }

    /// Whether both handles observe the same underlying state
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Repr::Never, Repr::Never) => true,
            (Repr::Aborted(a), Repr::Aborted(b)) => Arc::ptr_eq(a, b),
            (Repr::Live(a), Repr::Live(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<R> Signal<R>
where R: Clone + Send + Sync + 'static
{
    /// `Err(Aborted(reason))` once aborted
    pub fn check(&self) -> Result<(), Aborted<R>> {
        match self.reason() {
            Some(reason) => Err(Aborted(reason.clone())),
            None => Ok(()),
        }
    }
}

impl<R> AbortSignal<R> for Signal<R>
where R: Clone + Send + Sync + 'static
{
    fn is_aborted(&self) -> bool { Signal::is_aborted(self) }

    fn reason(&self) -> Option<R> { Signal::reason(self).cloned() }

    fn listen(&self, listener: Listener<R>) -> Result<Subscription, SubscribeError> { Ok(self.subscribe(listener)) }
}

impl<R: std::fmt::Debug + Send + Sync + 'static> std::fmt::Debug for Signal<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.0 {
            Repr::Never => "never",
            Repr::Aborted(_) => "sentinel",
            Repr::Live(_) => "live",
        };
        f.debug_struct("Signal").field("kind", &kind).field("reason", &self.reason()).finish()
    }
}

/// Shared state behind every live signal.
///
/// `reason` is written exactly once, while `state` is locked, and the registry
/// is drained under that same lock. No listener ever runs with the lock held.
pub(crate) struct Inner<R> {
    reason: OnceLock<R>,
    state: Mutex<State<R>>,
}

struct State<R> {
    registry: Registry<R>,
    /// Subscriptions a composite holds on its inputs
    upstream: Vec<Subscription>,
}

impl<R> Inner<R>
where R: Send + Sync + 'static
{
    pub fn new() -> Self { Self { reason: OnceLock::new(), state: Mutex::new(State { registry: Registry::new(), upstream: Vec::new() }) } }

    fn state(&self) -> std::sync::MutexGuard<'_, State<R>> { self.state.lock().expect("signal state lock is poisoned") }

    pub fn is_aborted(&self) -> bool { self.reason.get().is_some() }

    pub fn subscribe(self: &Arc<Self>, listener: Listener<R>) -> Subscription {
        let inserted = self.state().registry.insert(listener);
        match inserted {
            Ok(id) => {
                trace!("subscribed listener {id:?}");
                let registry: Weak<dyn Detach> = Arc::downgrade(self) as Weak<dyn Detach>;
                Subscription::registered(registry, id)
            }
            Err(_late) => {
                trace!("ignoring late listener");
                Subscription::inert()
            }
        }
    }

    /// Take ownership of a composite's upstream subscriptions.
    /// If this signal already aborted they are released right away.
    pub fn adopt_upstream(&self, upstream: Vec<Subscription>) {
        let rejected = {
            let mut state = self.state();
            if state.registry.is_closed() {
                upstream
            } else {
                state.upstream = upstream;
                Vec::new()
            }
        };
        for subscription in rejected {
            subscription.unsubscribe();
        }
    }

    /// Transition to aborted and dispatch to every listener registered so far.
    ///
    /// Only the first call has any effect. Every listener in the snapshot runs
    /// even if an earlier one panics; the panics come back as a [`DispatchError`].
    pub fn abort(&self, reason: R) -> Result<(), DispatchError> {
        let (listeners, upstream) = {
            let mut state = self.state();
            match self.reason.set(reason) {
                Ok(()) => (state.registry.drain(), std::mem::take(&mut state.upstream)),
                Err(rejected) => {
                    drop(state);
                    drop(rejected);
                    trace!("abort ignored, signal already aborted");
                    return Ok(());
                }
            }
        };

        // Composite: stop listening to the inputs that have not fired
        for subscription in upstream {
            subscription.unsubscribe();
        }

        let Some(reason) = self.reason.get() else {
            unreachable!("reason was set under the state lock");
        };
        debug!("signal aborted, dispatching to {} listener(s)", listeners.len());
        dispatch(listeners, reason)
    }
}

impl<R> Detach for Inner<R>
where R: Send + Sync + 'static
{
    fn detach(&self, id: SubscriptionId) {
        let removed = self.state().registry.remove(id);
        if removed.is_some() {
            trace!("unsubscribed listener {id:?}");
        }
        drop(removed);
    }
}

impl<R> Drop for Inner<R> {
    fn drop(&mut self) {
        let state = match self.state.get_mut() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        for subscription in std::mem::take(&mut state.upstream) {
            subscription.unsubscribe();
        }
    }
}

/// Run each listener with `reason`, isolating panics.
/// A panic carrying a [`DispatchError`] (from a nested composite dispatch) is flattened.
fn dispatch<R>(listeners: Vec<Listener<R>>, reason: &R) -> Result<(), DispatchError> {
    let mut failures = Vec::new();
    for listener in listeners {
        let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener(reason))) else {
            continue;
        };
        if let Some(nested) = payload.downcast_ref::<DispatchError>() {
            failures.extend(nested.failures().iter().cloned());
        } else {
            let failure = ListenerPanic::from_payload(payload.as_ref());
            warn!("abort listener panicked: {}", failure.message());
            failures.push(failure);
        }
    }
    DispatchError::check(failures)
}
