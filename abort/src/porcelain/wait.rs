use std::future::Future;

use tracing::warn;

use crate::{error::Aborted, listener::IntoListener, traits::AbortSignal};

/// Trait for awaiting an abort signal asynchronously
pub trait Wait<R> {
    /// Resolves with the reason once the signal aborts, immediately if it already has.
    /// Stays pending forever for a signal that can no longer abort.
    fn wait(&self) -> impl Future<Output = R> + Send;

    /// Run `work` until it completes or the signal aborts, whichever comes first.
    /// An abort that is already visible wins without polling `work`.
    fn or_abort<F>(&self, work: F) -> impl Future<Output = Result<F::Output, Aborted<R>>> + Send
    where
        F: Future + Send,
        F::Output: Send;
}

// Blanket implementation of Wait for anything that implements AbortSignal
impl<R, S> Wait<R> for S
where
    S: AbortSignal<R> + ?Sized,
    R: Clone + Send + Sync + 'static,
{
    fn wait(&self) -> impl Future<Output = R> + Send {
        async move {
            if let Some(reason) = self.reason() {
                return reason;
            }

            // Bridge the synchronous listener to async
            let (tx, rx) = tokio::sync::oneshot::channel();
            let _guard = match self.listen(tx.into_listener()) {
                Ok(subscription) => subscription.guard(),
                Err(err) => {
                    warn!("cannot wait on abort signal: {err}");
                    return std::future::pending().await;
                }
            };

            // The abort may have landed between the first check and the subscription
            if let Some(reason) = self.reason() {
                return reason;
            }

            match rx.await {
                Ok(reason) => reason,
                // The signal went away without aborting
                Err(_) => std::future::pending().await,
            }
        }
    }

    fn or_abort<F>(&self, work: F) -> impl Future<Output = Result<F::Output, Aborted<R>>> + Send
    where
        F: Future + Send,
        F::Output: Send,
    {
        async move {
            tokio::select! {
                biased;
                reason = self.wait() => Err(Aborted(reason)),
                output = work => Ok(output),
            }
        }
    }
}
