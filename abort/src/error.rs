use std::any::Any;

use thiserror::Error;

/// Boxed error produced by a foreign abort source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The abort reason, surfaced as an error to code that checks a signal.
///
/// Returned from: `Signal::check`, `Wait::or_abort`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("aborted: {0:?}")]
pub struct Aborted<R>(pub R);

impl<R> Aborted<R> {
    pub fn reason(&self) -> &R { &self.0 }
    pub fn into_reason(self) -> R { self.0 }
}

/// A signal source refused to register a listener.
///
/// Returned from: `any`, `AbortSignal::listen` on bridged sources
#[derive(Debug, Error)]
#[error("abort source rejected listener: {0}")]
pub struct SubscribeError(#[source] pub BoxError);

impl SubscribeError {
    pub fn new(err: impl Into<BoxError>) -> Self { Self(err.into()) }
}

/// One listener that panicked while an abort was being dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerPanic {
    message: String,
}

impl ListenerPanic {
    pub(crate) fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "<non-string panic payload>".to_string()
        };
        Self { message }
    }

    /// The panic message, if the payload was a string
    pub fn message(&self) -> &str { &self.message }
}

impl std::fmt::Display for ListenerPanic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "listener panicked: {}", self.message) }
}

/// Every listener failure from a single dispatch pass, in the order the
/// listeners ran. The pass itself always runs to completion.
///
/// Returned from: `Controller::trigger`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} abort listener(s) panicked; first: {}", .failures.len(), first_failure(.failures))]
pub struct DispatchError {
    failures: Vec<ListenerPanic>,
}

impl DispatchError {
    /// Returns `Ok` when nothing failed
    pub(crate) fn check(failures: Vec<ListenerPanic>) -> Result<(), DispatchError> {
        if failures.is_empty() { Ok(()) } else { Err(DispatchError { failures }) }
    }

    pub fn first(&self) -> &ListenerPanic { &self.failures[0] }

    pub fn failures(&self) -> &[ListenerPanic] { &self.failures }

    pub fn len(&self) -> usize { self.failures.len() }

    pub fn into_failures(self) -> Vec<ListenerPanic> { self.failures }
}

fn first_failure(failures: &[ListenerPanic]) -> &ListenerPanic { &failures[0] }
