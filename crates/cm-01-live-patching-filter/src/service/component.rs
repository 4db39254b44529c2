//! # Live Patching Filter Fields
//!
//! The sub-form a content-management filter embeds for the live-patching
//! templates. Rendering reads the form model, feeds the driving inputs to the
//! [`SelectionController`] and turns its snapshot into select fields.

use async_trait::async_trait;
use shared_bus::{FormEvent, FormFrame, Subscription, SubscriptionError};
use shared_types::FieldKey;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::domain::{render_fields, FilterFieldsView, ModelSelection, StalePolicy};
use crate::ports::{FilterFieldsApi, FilterFieldsProps, FormContext, Providers};

use super::controller::{ControllerConfig, DrivingInputs, SelectionController};

/// Live-patching filter sub-form.
pub struct LivePatchingFilterFields {
    context: FormContext,
    controller: SelectionController,
}

impl LivePatchingFilterFields {
    /// Mount the sub-form inside `context`, loading from `providers`.
    pub fn new(context: FormContext, providers: Providers) -> Self {
        Self::with_config(context, providers, ControllerConfig::default())
    }

    /// Mount with an explicit controller configuration.
    pub fn with_config(context: FormContext, providers: Providers, config: ControllerConfig) -> Self {
        Self {
            context,
            controller: SelectionController::with_config(providers, config),
        }
    }

    /// Mount with a specific stale-result policy.
    pub fn with_policy(context: FormContext, providers: Providers, stale_policy: StalePolicy) -> Self {
        Self::with_config(context, providers, ControllerConfig { stale_policy })
    }

    /// The enclosing form.
    pub fn context(&self) -> &FormContext {
        &self.context
    }

    /// The selection controller backing this sub-form.
    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    fn model_selection(&self) -> ModelSelection {
        let state = self.context.state();
        ModelSelection {
            client_id: state.id(FieldKey::ClientId),
            product_id: state.id(FieldKey::ProductId),
            kernel_id: state.id(FieldKey::KernelId),
        }
    }

    /// Re-render on every form event until the sub-form is torn down or the
    /// bus closes.
    ///
    /// Template and editing events update `props`; model changes only
    /// trigger a re-render. When the subscription lags, `props` is resynced
    /// from the bus frame. Returns the props last rendered with.
    pub async fn drive(
        self: Arc<Self>,
        mut props: FilterFieldsProps,
        mut subscription: Subscription,
    ) -> FilterFieldsProps {
        let mut shutdown = self.controller.shutdown_signal();
        self.render(&props);

        loop {
            if *shutdown.borrow() {
                break;
            }
            let received = tokio::select! {
                received = subscription.recv_checked() => received,
                _ = shutdown.changed() => break,
            };

            match received {
                Ok(event) => {
                    trace!(topic = ?event.topic(), "Form event received");
                    match event {
                        FormEvent::TemplateChanged(template) => props.template = template,
                        FormEvent::EditingChanged(editing) => props.editing = editing,
                        FormEvent::ValueChanged { .. } => {}
                    }
                }
                Err(SubscriptionError::Lagged(missed)) => {
                    warn!(missed, "Form events dropped, resyncing live patching fields");
                    resync(&mut props, subscription.frame());
                }
                Err(SubscriptionError::Closed | SubscriptionError::Timeout(_)) => {
                    debug!("Form bus closed, live patching fields stop re-rendering");
                    break;
                }
            }
            self.render(&props);
        }
        props
    }
}

fn resync(props: &mut FilterFieldsProps, frame: FormFrame) {
    if let Some(template) = frame.template {
        props.template = template;
    }
    if let Some(editing) = frame.editing {
        props.editing = editing;
    }
}

#[async_trait]
impl FilterFieldsApi for LivePatchingFilterFields {
    fn render(&self, props: &FilterFieldsProps) -> Option<FilterFieldsView> {
        let Some(template) = props.template else {
            self.controller.suspend();
            return None;
        };

        self.controller.activate();
        self.controller
            .observe(DrivingInputs::read(template, &self.context));

        let snapshot = self.controller.snapshot();
        Some(render_fields(
            template,
            props.editing,
            self.model_selection(),
            &snapshot,
        ))
    }

    fn tear_down(&self) {
        self.controller.tear_down();
    }

    fn is_torn_down(&self) -> bool {
        self.controller.is_torn_down()
    }

    async fn settle(&self) {
        self.controller.settle().await;
    }
}
