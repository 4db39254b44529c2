//! In-memory form model shared between the enclosing form and the sub-form.

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use shared_bus::{FormEvent, FormEventPublisher};
use shared_types::FormModel;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

use crate::ports::{FormState, ModelWriter};

/// Writes kept in the log; older entries are evicted first.
pub const WRITE_LOG_CAPACITY: usize = 1024;

/// Form model implementing both sides of the form context.
///
/// Every write is appended to a bounded log and, when a publisher is
/// attached, announced as [`FormEvent::ValueChanged`].
#[derive(Default)]
pub struct SharedFormModel {
    model: RwLock<FormModel>,
    publisher: Option<Arc<dyn FormEventPublisher>>,
    writes: Mutex<VecDeque<(String, Value)>>,
}

impl SharedFormModel {
    /// Empty model without a publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Model seeded with existing values.
    pub fn with_model(model: FormModel) -> Self {
        Self {
            model: RwLock::new(model),
            ..Self::default()
        }
    }

    /// Announce writes on the form bus.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn FormEventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Copy of the current model.
    pub fn snapshot(&self) -> FormModel {
        self.model.read().clone()
    }

    /// The last [`WRITE_LOG_CAPACITY`] writes, oldest first.
    pub fn write_log(&self) -> Vec<(String, Value)> {
        self.writes.lock().iter().cloned().collect()
    }

    /// Number of logged writes to `key`.
    pub fn writes_to(&self, key: &str) -> usize {
        self.writes.lock().iter().filter(|(k, _)| k == key).count()
    }
}

impl FormState for SharedFormModel {
    fn value(&self, key: &str) -> Option<Value> {
        self.model.read().get(key).cloned()
    }
}

impl ModelWriter for SharedFormModel {
    fn set_model_value(&self, key: &str, value: Value) {
        self.model.write().set(key, value.clone());
        {
            let mut writes = self.writes.lock();
            if writes.len() == WRITE_LOG_CAPACITY {
                writes.pop_front();
            }
            writes.push_back((key.to_string(), value.clone()));
        }
        trace!(key, %value, "Form model updated");

        if let Some(publisher) = &self.publisher {
            publisher.publish(FormEvent::ValueChanged {
                key: key.to_string(),
                value,
            });
        }
    }
}
