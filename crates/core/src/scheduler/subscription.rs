//! Consumer-side subscription handle.

use std::sync::{Arc, Weak};

use futures::Stream;
use log::{debug, warn};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use super::entry::CacheEntry;
use super::service::SchedulerInner;
use super::{CacheKey, FeedUpdate};

/// Registered interest in one (symbol, priority) key.
///
/// Yields the current value first (when one exists) and then every refresh
/// in fetch-completion order. Dropping the handle unsubscribes.
pub struct Subscription {
    id: u64,
    entry: Arc<CacheEntry>,
    scheduler: Weak<SchedulerInner>,
    receiver: broadcast::Receiver<FeedUpdate>,
    initial: Option<FeedUpdate>,
    callbacks: Vec<JoinHandle<()>>,
    released: bool,
}

impl Subscription {
    pub(crate) fn new(
        id: u64,
        entry: Arc<CacheEntry>,
        scheduler: Weak<SchedulerInner>,
        receiver: broadcast::Receiver<FeedUpdate>,
        initial: Option<FeedUpdate>,
    ) -> Self {
        Self {
            id,
            entry,
            scheduler,
            receiver,
            initial,
            callbacks: Vec::new(),
            released: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn key(&self) -> &CacheKey {
        &self.entry.key
    }

    /// Next update, waiting for the following refresh when none is queued.
    ///
    /// The handle keeps its entry alive, so this waits even after the
    /// scheduler is dropped. Bound the wait with a timeout where that matters.
    ///
    /// A receiver that falls more than the channel capacity behind skips to
    /// the oldest retained update.
    pub async fn recv(&mut self) -> Option<FeedUpdate> {
        if let Some(update) = self.initial.take() {
            return Some(update);
        }
        loop {
            match self.receiver.recv().await {
                Ok(update) => return Some(update),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "Subscription {} to {} lagged, skipped {} updates",
                        self.id, self.entry.key, skipped
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn has_live_timer(&self) -> bool {
        self.entry.has_live_timer()
    }

    /// Run `callback` on every refresh until this subscription ends.
    ///
    /// Callbacks run on a dedicated task, so a slow callback never delays
    /// other subscribers. Must be called within a Tokio runtime.
    pub fn on_update<F>(&mut self, callback: F)
    where
        F: Fn(FeedUpdate) + Send + 'static,
    {
        let mut receiver = self.entry.subscribe_updates();
        let key = self.entry.key.clone();
        let handle = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(update) => callback(update),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Callback for {} lagged, skipped {} updates", key, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        self.callbacks.push(handle);
    }

    /// Turn the subscription into a stream of updates.
    ///
    /// The stream owns the subscription; dropping it unsubscribes.
    pub fn into_stream(self) -> impl Stream<Item = FeedUpdate> + Send + 'static {
        futures::stream::unfold(self, |mut subscription| async move {
            let update = subscription.recv().await?;
            Some((update, subscription))
        })
    }

    /// Stop receiving updates. Equivalent to dropping the handle.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        for handle in self.callbacks.drain(..) {
            handle.abort();
        }

        debug!("Subscription {} to {} released", self.id, self.entry.key);
        if let Some(scheduler) = self.scheduler.upgrade() {
            scheduler.release(&self.entry);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
