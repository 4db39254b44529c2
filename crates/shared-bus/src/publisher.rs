//! # Event Publisher
//!
//! Defines the publishing side of the form bus.

use crate::events::{EventFilter, EventTopic, FormEvent, FormFrame};
use crate::subscriber::{EventStream, EventSubscriber, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::{broadcast, watch};
use tracing::{debug, trace};

/// Trait for publishing form events.
pub trait FormEventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the event.
    fn publish(&self, event: FormEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the form bus.
///
/// Uses `tokio::sync::broadcast` so the enclosing form and any number of
/// sub-components can observe the same change stream.
pub struct InMemoryFormBus {
    /// Broadcast sender for events.
    sender: broadcast::Sender<FormEvent>,

    /// Latest template and editing state, kept outside the bounded channel.
    frame: watch::Sender<FormFrame>,

    /// Active subscription count by topic.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryFormBus {
    /// Create a new bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        let (frame, _) = watch::channel(FormFrame::default());
        Self {
            sender,
            frame,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Get a stream of events matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Latest template and editing state published so far.
    #[must_use]
    pub fn frame(&self) -> FormFrame {
        *self.frame.borrow()
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryFormBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryFormBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let topic_key = format!("{:?}/{:?}", filter.topics, filter.keys);

        if let Ok(mut subs) = self.subscriptions.write() {
            *subs.entry(topic_key.clone()).or_insert(0) += 1;
        }

        debug!(topics = ?filter.topics, keys = ?filter.keys, "New form subscription created");

        Subscription::new(
            receiver,
            self.frame.subscribe(),
            filter,
            self.subscriptions.clone(),
            topic_key,
        )
    }
}

impl FormEventPublisher for InMemoryFormBus {
    fn publish(&self, event: FormEvent) -> usize {
        let topic = event.topic();

        self.events_published.fetch_add(1, Ordering::Relaxed);
        if topic != EventTopic::Model {
            self.frame.send_modify(|frame| frame.apply(&event));
        }

        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(topic = ?topic, receivers = receiver_count, "Form event published");
                receiver_count
            }
            Err(_) => {
                // Nobody is listening yet; the form still works without observers.
                trace!(topic = ?topic, "Form event dropped (no receivers)");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
