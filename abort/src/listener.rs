/// A callback invoked at most once, with the abort reason, when a signal aborts.
pub type Listener<R> = Box<dyn FnOnce(&R) + Send + 'static>;

/// Trait for types that can be converted into abort listeners.
pub trait IntoListener<R> {
    fn into_listener(self) -> Listener<R>;
}

// Implementation for closures
impl<F, R> IntoListener<R> for F
where F: FnOnce(&R) + Send + 'static
{
    fn into_listener(self) -> Listener<R> { Box::new(self) }
}

impl<R> IntoListener<R> for std::sync::mpsc::Sender<R>
where R: Clone + Send + 'static
{
    fn into_listener(self) -> Listener<R> {
        Box::new(move |reason: &R| {
            let _ = self.send(reason.clone()); // Ignore send errors
        })
    }
}

#[cfg(feature = "tokio")]
impl<R> IntoListener<R> for tokio::sync::mpsc::UnboundedSender<R>
where R: Clone + Send + 'static
{
    fn into_listener(self) -> Listener<R> {
        Box::new(move |reason: &R| {
            let _ = self.send(reason.clone()); // Ignore send errors
        })
    }
}

#[cfg(feature = "tokio")]
impl<R> IntoListener<R> for tokio::sync::oneshot::Sender<R>
where R: Clone + Send + 'static
{
    fn into_listener(self) -> Listener<R> {
        Box::new(move |reason: &R| {
            let _ = self.send(reason.clone()); // Receiver may be gone
        })
    }
}
