use std::collections::BTreeMap;

use crate::listener::Listener;

/// Identifies one registration within a single registry.
/// Ids are handed out in increasing order, so map order is subscription order.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct SubscriptionId(u64);

/// Ordered listener registry for one signal.
///
/// Once [`Registry::drain`] has run the registry is closed and every later
/// [`Registry::insert`] is rejected.
pub(crate) struct Registry<R> {
    listeners: BTreeMap<SubscriptionId, Listener<R>>,
    next_id: u64,
    closed: bool,
}

impl<R> Registry<R> {
    pub fn new() -> Self { Self { listeners: BTreeMap::new(), next_id: 0, closed: false } }

    /// Appends a listener at the end of the subscription order.
    /// A closed registry hands the listener back untouched.
    pub fn insert(&mut self, listener: Listener<R>) -> Result<SubscriptionId, Listener<R>> {
        if self.closed {
            return Err(listener);
        }
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, listener);
        Ok(id)
    }

    /// Removes a registration. Unknown or already removed ids yield `None`.
    /// The listener is returned so the caller can drop it outside any lock.
    pub fn remove(&mut self, id: SubscriptionId) -> Option<Listener<R>> { self.listeners.remove(&id) }

    /// Closes the registry and hands back every live listener in subscription order.
    pub fn drain(&mut self) -> Vec<Listener<R>> {
        self.closed = true;
        std::mem::take(&mut self.listeners).into_values().collect()
    }

    pub fn len(&self) -> usize { self.listeners.len() }

    pub fn is_closed(&self) -> bool { self.closed }
}
