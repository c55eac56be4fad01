//! Subscription fan-out for feed price batches
//!
//! Listeners register through [`SubscriptionHub::subscribe`] and receive
//! every non-empty tick batch on a private unbounded channel. A new listener
//! is never left without baseline data: one initial batch carrying the
//! current price of every requested symbol is queued before `subscribe`
//! returns, ahead of any periodic tick.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::market::feed::MockMarketFeed;
use crate::market::PriceBatch;

/// Identity of a registered listener, used to unsubscribe it later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Fans out feed batches to all registered listeners
pub struct SubscriptionHub {
    feed: Arc<MockMarketFeed>,
    subscribers: Arc<DashMap<Uuid, UnboundedSender<PriceBatch>>>,
    dispatch_task: JoinHandle<()>,
}

impl SubscriptionHub {
    /// Create a hub over the given feed and start its dispatch task
    pub fn new(feed: Arc<MockMarketFeed>) -> Arc<Self> {
        let subscribers: Arc<DashMap<Uuid, UnboundedSender<PriceBatch>>> =
            Arc::new(DashMap::new());

        let mut batch_rx = feed.batch_stream();
        let dispatch_subscribers = Arc::clone(&subscribers);
        let dispatch_task = tokio::spawn(async move {
            loop {
                match batch_rx.recv().await {
                    Ok(batch) => {
                        // Each listener gets the whole batch; a send failure
                        // means the receiver was dropped, so drop the entry.
                        dispatch_subscribers
                            .retain(|_, tx| tx.send(batch.clone()).is_ok());
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Hub lagged behind feed batches");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Feed channel closed, stopping hub dispatch");
                        break;
                    }
                }
            }
        });

        Arc::new(Self {
            feed,
            subscribers,
            dispatch_task,
        })
    }

    /// Register a listener for the given symbols
    ///
    /// Adds the symbols to the feed's watched set (seeding any unseen ones)
    /// and queues an initial batch with the current price of every requested
    /// symbol — even unchanged ones — before returning. Subscribing again
    /// adds a new listener; it does not replace an earlier one.
    pub fn subscribe(
        &self,
        symbols: &[String],
    ) -> (SubscriptionId, UnboundedReceiver<PriceBatch>) {
        self.feed.watch_symbols(symbols);

        let initial: PriceBatch = symbols
            .iter()
            .map(|s| (s.clone(), self.feed.get_or_create_price(s)))
            .collect();

        let (tx, rx) = mpsc::unbounded_channel();
        if !initial.is_empty() {
            // Queued before the sender is registered, so the baseline batch
            // is always the first thing the listener sees.
            let _ = tx.send(initial);
        }

        let id = Uuid::new_v4();
        self.subscribers.insert(id, tx);
        debug!(subscription_id = %id, symbols = symbols.len(), "Listener subscribed");
        (SubscriptionId(id), rx)
    }

    /// Remove a listener. Unknown ids are tolerated as a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if self.subscribers.remove(&id.0).is_some() {
            debug!(subscription_id = %id, "Listener unsubscribed");
        }
    }

    /// Number of currently registered listeners
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// The feed this hub fans out for
    pub fn feed(&self) -> &Arc<MockMarketFeed> {
        &self.feed
    }
}

impl Drop for SubscriptionHub {
    fn drop(&mut self) {
        self.dispatch_task.abort();
    }
}
