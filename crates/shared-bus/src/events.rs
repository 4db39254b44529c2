//! # Form Events
//!
//! Defines the events that flow through the form bus.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{FieldKey, Template};

/// All events that can be published to the form bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormEvent {
    /// A model key was written. Published after the write is applied.
    ValueChanged {
        /// Model key.
        key: String,
        /// New value (`Value::Null` for a cleared field).
        value: Value,
    },

    /// The enclosing form switched filter template.
    TemplateChanged(Option<Template>),

    /// The enclosing form entered or left edit mode.
    EditingChanged(bool),
}

impl FormEvent {
    /// Convenience constructor for a recognized key.
    #[must_use]
    pub fn value_changed(key: FieldKey, value: Value) -> Self {
        Self::ValueChanged {
            key: key.as_str().to_string(),
            value,
        }
    }

    /// Get the topic this event belongs to.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ValueChanged { .. } => EventTopic::Model,
            Self::TemplateChanged(_) => EventTopic::Template,
            Self::EditingChanged(_) => EventTopic::Editing,
        }
    }

    /// Model key touched by this event, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::ValueChanged { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Latest template and editing state announced on the bus.
///
/// Subscribers that lagged behind read it to recover the state carried by
/// the events they missed. A field stays `None` until its first event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormFrame {
    /// Last published template.
    pub template: Option<Option<Template>>,
    /// Last published edit-mode flag.
    pub editing: Option<bool>,
}

impl FormFrame {
    /// Fold `event` into the frame.
    pub fn apply(&mut self, event: &FormEvent) {
        match event {
            FormEvent::TemplateChanged(template) => self.template = Some(*template),
            FormEvent::EditingChanged(editing) => self.editing = Some(*editing),
            FormEvent::ValueChanged { .. } => {}
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Model writes.
    Model,
    /// Template switches.
    Template,
    /// Edit-mode toggles.
    Editing,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Model keys to include for `Model` events. Empty means all keys.
    pub keys: Vec<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            keys: Vec::new(),
        }
    }

    /// Restrict model events to the given recognized keys.
    #[must_use]
    pub fn with_keys(mut self, keys: &[FieldKey]) -> Self {
        self.keys = keys.iter().map(|k| k.as_str().to_string()).collect();
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &FormEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let key_match = match event.key() {
            Some(key) => self.keys.is_empty() || self.keys.iter().any(|k| k == key),
            None => true,
        };

        topic_match && key_match
    }
}
