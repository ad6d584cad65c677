//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio_stream::wrappers::BroadcastStream;

use simhome_domain::error::SimHomeError;
use simhome_domain::event::HouseEvent;

use crate::ports::EventPublisher;

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped). Cloning yields another handle on the
/// same channel.
#[derive(Clone)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<HouseEvent>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; configuration rejects that value first.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events on this bus.
    ///
    /// The subscription receives every event published *after* it is
    /// created, and stops receiving as soon as it is dropped.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: HouseEvent) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        // send only fails when nobody listens
        match self.sender.send(event) {
            Ok(receivers) => tracing::trace!(receivers, "event published"),
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(event = event.name(), "event published without subscribers");
            }
        }
        async { Ok(()) }
    }
}

/// Guard over one registration on the bus. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<HouseEvent>,
}

impl Subscription {
    /// Wait for the next event.
    ///
    /// Skips over events lost to lagging (logging how many) and returns
    /// `None` once every bus handle is gone.
    pub async fn recv(&mut self) -> Option<HouseEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged, some events were dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<HouseEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged, some events were dropped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Turn the subscription into a stream that reports lag to the caller.
    #[must_use]
    pub fn into_stream(self) -> BroadcastStream<HouseEvent> {
        BroadcastStream::new(self.receiver)
    }

    /// Explicitly end the subscription.
    pub fn unsubscribe(self) {
        drop(self);
    }
}
