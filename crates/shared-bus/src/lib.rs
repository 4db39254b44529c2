//! # Shared Bus - Form Event Bus
//!
//! Carries change notifications from the enclosing filter form to the
//! sub-components rendered inside it.
//!
//! ## Reactive Cycle
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────────┐
//! │ Filter form  │                    │ Sub-component    │
//! │ (model owner)│    publish()       │ (controller)     │
//! │              │ ──────┐            │                  │
//! └──────────────┘       │            └──────────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Form Bus    │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! A write to the model is published after it has been applied, so a
//! subscriber always observes the new value when it re-reads the model.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, FormEvent, FormFrame};
pub use publisher::{FormEventPublisher, InMemoryFormBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
