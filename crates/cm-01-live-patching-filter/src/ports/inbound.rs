//! # Inbound Ports
//!
//! API trait defining what the live-patching filter fields can do for the
//! enclosing form.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::Template;

use crate::domain::FilterFieldsView;

/// Inputs handed down by the enclosing filter form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterFieldsProps {
    /// Filter template being edited; `None` renders nothing.
    pub template: Option<Template>,
    /// Whether an existing filter is being edited.
    pub editing: bool,
}

impl FilterFieldsProps {
    /// Props for creating a new filter with the given template.
    pub fn new(template: Template) -> Self {
        Self {
            template: Some(template),
            editing: false,
        }
    }

    /// Mark the filter as being edited.
    #[must_use]
    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }
}

/// Live patching filter fields - inbound port.
#[async_trait]
pub trait FilterFieldsApi: Send + Sync {
    /// Reconcile with the current form model and render the fields.
    ///
    /// Returns `None` when no template is selected.
    fn render(&self, props: &FilterFieldsProps) -> Option<FilterFieldsView>;

    /// Stop reacting: pending loads are dropped and nothing is written afterwards.
    fn tear_down(&self);

    /// Whether [`FilterFieldsApi::tear_down`] has run.
    fn is_torn_down(&self) -> bool;

    /// Wait until no provider request is in flight.
    async fn settle(&self);
}
