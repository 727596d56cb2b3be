use std::sync::{Mutex, Weak};

use crate::registry::SubscriptionId;

/// Something a [`Subscription`] can remove itself from
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, id: SubscriptionId);
}

enum Target {
    /// Late listener or sentinel: nothing was retained
    Inert,
    /// A registration in a native signal's registry
    Registry { registry: Weak<dyn Detach>, id: SubscriptionId },
    /// Custom release logic, run at most once
    Release(Mutex<Option<Box<dyn FnOnce() + Send>>>),
}

/// Handle returned by every subscribe call - the only way to unsubscribe.
///
/// Dropping a `Subscription` leaves the listener registered. Use [`Subscription::guard`]
/// for scoped removal. The handle never keeps its signal alive.
#[must_use = "dropping a Subscription does not unsubscribe; keep it, call .unsubscribe(), or convert it with .guard()"]
pub struct Subscription {
    target: Target,
}

impl Subscription {
    /// A handle that refers to nothing. `unsubscribe` on it is a no-op.
    pub fn inert() -> Self { Self { target: Target::Inert } }

    /// A handle whose unsubscribe runs `release` exactly once
    pub fn from_release<F>(release: F) -> Self
    where F: FnOnce() + Send + 'static {
        Self { target: Target::Release(Mutex::new(Some(Box::new(release)))) }
    }

    pub(crate) fn registered(registry: Weak<dyn Detach>, id: SubscriptionId) -> Self { Self { target: Target::Registry { registry, id } } }

    /// Whether this handle was ever attached to a live registration
    pub fn is_inert(&self) -> bool { matches!(self.target, Target::Inert) }

    /// Removes the listener if it is still registered. Safe to call any number of
    /// times, after the signal aborted, or after the signal was dropped.
    pub fn unsubscribe(&self) {
        match &self.target {
            Target::Inert => {}
            Target::Registry { registry, id } => {
                if let Some(registry) = registry.upgrade() {
                    registry.detach(*id);
                }
            }
            Target::Release(release) => {
                let release = release.lock().expect("release lock is poisoned").take();
                if let Some(release) = release {
                    release();
                }
            }
        }
    }

    /// Convert into a guard that unsubscribes when dropped
    pub fn guard(self) -> SubscriptionGuard { SubscriptionGuard(Some(self)) }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.target {
            Target::Inert => "inert",
            Target::Registry { .. } => "registry",
            Target::Release(_) => "release",
        };
        f.debug_struct("Subscription").field("target", &kind).finish()
    }
}

/// Scoped form of a [`Subscription`]: unsubscribes on drop.
#[must_use = "dropping a SubscriptionGuard unsubscribes immediately"]
#[derive(Debug)]
pub struct SubscriptionGuard(Option<Subscription>);

impl SubscriptionGuard {
    /// Give up scoped removal and get the plain handle back
    pub fn into_inner(mut self) -> Subscription { self.0.take().unwrap_or_else(Subscription::inert) }

    pub fn unsubscribe(&self) {
        if let Some(subscription) = &self.0 {
            subscription.unsubscribe();
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(subscription) = self.0.take() {
            subscription.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn test_release_runs_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let subscription = {
            let released = released.clone();
            Subscription::from_release(move || {
                released.fetch_add(1, Ordering::SeqCst);
            })
        };
        subscription.unsubscribe();
        subscription.unsubscribe();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let guard = {
            let released = released.clone();
            Subscription::from_release(move || {
                released.fetch_add(1, Ordering::SeqCst);
            })
            .guard()
        };
        assert_eq!(released.load(Ordering::SeqCst), 0);
        drop(guard);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_into_inner_keeps_registration() {
        let released = Arc::new(AtomicUsize::new(0));
        let guard = {
            let released = released.clone();
            Subscription::from_release(move || {
                released.fetch_add(1, Ordering::SeqCst);
            })
            .guard()
        };
        let subscription = guard.into_inner();
        assert_eq!(released.load(Ordering::SeqCst), 0);
        subscription.unsubscribe();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_inert_unsubscribe_is_noop() {
        let subscription = Subscription::inert();
        assert!(subscription.is_inert());
        subscription.unsubscribe();
        subscription.unsubscribe();
    }
}
