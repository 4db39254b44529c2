//! # Event Subscriber
//!
//! Defines the subscription side of the form bus.

use crate::events::{EventFilter, FormEvent, FormFrame};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The form bus was closed.
    #[error("Form bus closed")]
    Closed,

    /// No matching event arrived in time.
    #[error("No event within {0:?}")]
    Timeout(Duration),

    /// The subscriber fell behind and this many events were dropped.
    #[error("Subscriber lagged, {0} form events dropped")]
    Lagged(u64),
}

/// Trait for subscribing to events from the bus.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe to events matching a filter.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

/// A subscription handle for receiving events.
///
/// When dropped, the subscription is automatically cleaned up.
pub struct Subscription {
    /// Broadcast receiver wrapped as a stream.
    stream: BroadcastStream<FormEvent>,

    /// Latest template and editing state on the bus.
    frame: watch::Receiver<FormFrame>,

    /// Filter for this subscription.
    filter: EventFilter,

    /// Reference to subscription tracking (for cleanup).
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Topic key for this subscription.
    topic_key: String,
}

impl Subscription {
    /// Create a new subscription.
    pub(crate) fn new(
        receiver: broadcast::Receiver<FormEvent>,
        frame: watch::Receiver<FormFrame>,
        filter: EventFilter,
        subscriptions: Arc<RwLock<HashMap<String, usize>>>,
        topic_key: String,
    ) -> Self {
        Self {
            stream: BroadcastStream::new(receiver),
            frame,
            filter,
            subscriptions,
            topic_key,
        }
    }

    /// Receive the next event that matches the filter.
    ///
    /// Dropped events are skipped silently; use
    /// [`recv_checked`](Self::recv_checked) to find out about them.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next matching event
    /// - `None` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Option<FormEvent> {
        self.next().await
    }

    /// Receive the next matching event, reporting dropped events.
    ///
    /// # Errors
    ///
    /// - `Lagged(n)` - `n` events were dropped before the next one; the
    ///   missed template and editing state is available from [`frame`](Self::frame)
    /// - `Closed` - The bus was dropped
    pub async fn recv_checked(&mut self) -> Result<FormEvent, SubscriptionError> {
        std::future::poll_fn(|cx| self.poll_checked(cx)).await
    }

    /// Latest template and editing state published on the bus.
    #[must_use]
    pub fn frame(&self) -> FormFrame {
        *self.frame.borrow()
    }

    /// Receive the next matching event, giving up after `limit`.
    pub async fn recv_timeout(&mut self, limit: Duration) -> Result<FormEvent, SubscriptionError> {
        match tokio::time::timeout(limit, self.recv()).await {
            Ok(Some(event)) => Ok(event),
            Ok(None) => Err(SubscriptionError::Closed),
            Err(_) => Err(SubscriptionError::Timeout(limit)),
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn event_filter(&self) -> &EventFilter {
        &self.filter
    }

    fn poll_checked(&mut self, cx: &mut Context<'_>) -> Poll<Result<FormEvent, SubscriptionError>> {
        loop {
            match Pin::new(&mut self.stream).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if self.filter.matches(&event) {
                        return Poll::Ready(Ok(event));
                    }
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    return Poll::Ready(Err(SubscriptionError::Lagged(count)));
                }
                Poll::Ready(None) => return Poll::Ready(Err(SubscriptionError::Closed)),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl Stream for Subscription {
    type Item = FormEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match self.poll_checked(cx) {
                Poll::Ready(Ok(event)) => return Poll::Ready(Some(event)),
                Poll::Ready(Err(SubscriptionError::Lagged(count))) => {
                    warn!(lagged = count, "Subscriber lagged, some form events dropped");
                }
                Poll::Ready(Err(_)) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Ok(mut subs) = self.subscriptions.write() else {
            return;
        };
        let Some(count) = subs.get_mut(&self.topic_key) else {
            debug!(topic = %self.topic_key, "Form subscription dropped");
            return;
        };

        *count = count.saturating_sub(1);
        if *count == 0 {
            subs.remove(&self.topic_key);
        }
        debug!(topic = %self.topic_key, "Form subscription dropped");
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct EventStream {
    subscription: Subscription,
}

impl EventStream {
    /// Create a new event stream from a subscription.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// Get the filter for this stream.
    #[must_use]
    pub fn event_filter(&self) -> &EventFilter {
        self.subscription.event_filter()
    }
}

impl Stream for EventStream {
    type Item = FormEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.subscription).poll_next(cx)
    }
}
