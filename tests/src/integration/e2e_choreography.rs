//! # End-to-End Choreography Tests
//!
//! Tests the live-patching sub-form inside an enclosing form, wired through
//! the form bus:
//!
//! ```text
//! [Enclosing form] ──TemplateChanged / EditingChanged──→ [Form Bus]
//!        │                                                  │
//!        └── set_model_value(clientId / productId) ──→ ValueChanged
//!                                                           │
//!                                                           ↓
//!                                          [LivePatchingFilterFields::drive]
//!                                                           │
//!                                              get_kernels(scope) (async)
//!                                                           │
//!                                                           ↓
//!                                     set_model_value(kernelId) ──→ ValueChanged
//! ```
//!
//! ## Test Categories
//!
//! 1. **Happy Path**: template and scope selection seed the default kernel
//! 2. **Template Switch**: the newly active scope wins over in-flight loads
//! 3. **Degraded Providers**: failures leave the form usable
//! 4. **Tear-down**: unmounting stops all writes

// =============================================================================
// TEST FIXTURES (only compiled during tests)
// =============================================================================

#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use std::time::Duration;

#[cfg(test)]
use cm_01_live_patching_filter::{
    FailingProvider, FilterFieldsApi, FilterFieldsProps, FormContext, FormState,
    LivePatchingFilterFields, ModelWriter, Providers, SharedFormModel, StaticCatalog,
};

#[cfg(test)]
use shared_bus::{EventFilter, EventSubscriber, EventTopic, FormEvent, FormEventPublisher, InMemoryFormBus};

#[cfg(test)]
use shared_types::{EntityId, FieldKey, Template};

#[cfg(test)]
const CATALOG: &str = r#"{
    "clients": [
        { "id": 1, "name": "web-01" },
        { "id": 2, "name": "db-01" }
    ],
    "products": [{ "id": 7, "name": "SLES 15 SP5" }],
    "kernels": {
        "client:1": [
            { "id": 345, "version": "1.2.3" },
            { "id": 456, "version": "1.2.4", "default": true }
        ],
        "client:2": [{ "id": 500, "version": "5.3.18" }],
        "product:7": [{ "id": 900, "version": "2.0" }]
    }
}"#;

/// An enclosing form with the sub-form mounted and driven by the bus.
#[cfg(test)]
struct FormHarness {
    bus: Arc<InMemoryFormBus>,
    model: Arc<SharedFormModel>,
    fields: Arc<LivePatchingFilterFields>,
    driver: tokio::task::JoinHandle<FilterFieldsProps>,
}

#[cfg(test)]
impl FormHarness {
    fn mount(providers: Providers) -> Self {
        let bus = Arc::new(InMemoryFormBus::new());
        let model = Arc::new(SharedFormModel::new().with_publisher(bus.clone()));
        let fields = Arc::new(LivePatchingFilterFields::new(
            FormContext::shared(model.clone()),
            providers,
        ));
        let driver = tokio::spawn(
            fields
                .clone()
                .drive(FilterFieldsProps::default(), bus.subscribe(EventFilter::all())),
        );
        Self {
            bus,
            model,
            fields,
            driver,
        }
    }

    fn with_catalog(catalog: StaticCatalog) -> Self {
        Self::mount(Providers::from_catalog(Arc::new(catalog)))
    }

    fn template(&self, template: Option<Template>) {
        self.bus.publish(FormEvent::TemplateChanged(template));
    }

    fn set(&self, key: FieldKey, value: serde_json::Value) {
        self.model.set_model_value(key.as_str(), value);
    }

    fn kernel(&self) -> Option<EntityId> {
        self.model.id(FieldKey::KernelId)
    }

    /// Poll until `kernelId` equals `expected`.
    async fn kernel_becomes(&self, expected: Option<EntityId>) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while tokio::time::Instant::now() < deadline {
            if self.kernel() == expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    async fn unmount(self) -> FilterFieldsProps {
        self.fields.tear_down();
        self.driver.await.unwrap_or_default()
    }
}

// =============================================================================
// HAPPY PATH
// =============================================================================

#[cfg(test)]
mod happy_path {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_client_selection_seeds_default_kernel() {
        let form = FormHarness::with_catalog(StaticCatalog::from_json(CATALOG).unwrap());

        form.template(Some(Template::LivePatchingSystem));
        form.set(FieldKey::ClientId, serde_json::json!(1));

        assert!(form.kernel_becomes(Some(EntityId(456))).await);
        form.fields.settle().await;

        let view = form
            .fields
            .render(&FilterFieldsProps::new(Template::LivePatchingSystem))
            .unwrap();
        assert_eq!(view.kernel.selected_label(), Some("1.2.4 (default)"));
        assert_eq!(view.client.unwrap().options.len(), 2);

        let props = form.unmount().await;
        assert_eq!(props.template, Some(Template::LivePatchingSystem));
    }

    #[tokio::test]
    async fn test_kernel_write_is_announced_once_per_derivation() {
        let form = FormHarness::with_catalog(StaticCatalog::from_json(CATALOG).unwrap());
        let mut kernel_events = form
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Model]).with_keys(&[FieldKey::KernelId]));

        form.template(Some(Template::LivePatchingSystem));
        form.set(FieldKey::ClientId, serde_json::json!(2));

        let event = kernel_events
            .recv_timeout(Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(event, FormEvent::value_changed(FieldKey::KernelId, serde_json::json!(500)));

        // Re-publishing the same client does not re-derive.
        form.set(FieldKey::ClientId, serde_json::json!(2));
        form.fields.settle().await;
        assert!(kernel_events
            .recv_timeout(Duration::from_millis(100))
            .await
            .is_err());

        form.unmount().await;
    }

    #[tokio::test]
    async fn test_editing_event_keeps_selection() {
        let form = FormHarness::with_catalog(StaticCatalog::from_json(CATALOG).unwrap());
        form.template(Some(Template::LivePatchingProduct));
        form.set(FieldKey::ProductId, serde_json::json!("7"));
        assert!(form.kernel_becomes(Some(EntityId(900))).await);

        form.bus.publish(FormEvent::EditingChanged(true));
        tokio::time::sleep(Duration::from_millis(20)).await;
        let props = form.unmount().await;

        assert!(props.editing);
        assert_eq!(props.template, Some(Template::LivePatchingProduct));
    }
}

// =============================================================================
// TEMPLATE SWITCH
// =============================================================================

#[cfg(test)]
mod template_switch {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_switch_to_product_while_client_load_in_flight() {
        let catalog = StaticCatalog::from_json(CATALOG)
            .unwrap()
            .with_latency(Duration::from_millis(50));
        let form = FormHarness::with_catalog(catalog);

        form.set(FieldKey::ClientId, serde_json::json!(1));
        form.set(FieldKey::ProductId, serde_json::json!(7));
        form.template(Some(Template::LivePatchingSystem));
        tokio::time::sleep(Duration::from_millis(10)).await;
        form.template(Some(Template::LivePatchingProduct));

        assert!(form.kernel_becomes(Some(EntityId(900))).await);
        form.fields.settle().await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(form.kernel(), Some(EntityId(900)));
        assert_eq!(
            form.fields.controller().snapshot().kernels[0].id,
            EntityId(900)
        );
        form.unmount().await;
    }

    #[tokio::test]
    async fn test_clearing_template_stops_rendering() {
        let form = FormHarness::with_catalog(StaticCatalog::from_json(CATALOG).unwrap());
        let model = form.model.clone();
        form.template(Some(Template::LivePatchingSystem));
        form.set(FieldKey::ClientId, serde_json::json!(1));
        assert!(form.kernel_becomes(Some(EntityId(456))).await);

        form.template(None);
        let writes = model.writes_to("kernelId");
        form.set(FieldKey::ClientId, serde_json::json!(2));
        tokio::time::sleep(Duration::from_millis(20)).await;
        form.fields.settle().await;

        let props = form.unmount().await;
        assert_eq!(props.template, None);
        assert_eq!(model.writes_to("kernelId"), writes);
        assert_eq!(model.id(FieldKey::KernelId), Some(EntityId(456)));
    }
}

// =============================================================================
// DEGRADED PROVIDERS
// =============================================================================

#[cfg(test)]
mod degraded_providers {
    use super::*;

    #[tokio::test]
    async fn test_failing_backend_renders_empty_disabled_fields() {
        let form = FormHarness::mount(Providers::from_catalog(Arc::new(FailingProvider::new(
            "backend down",
        ))));
        form.template(Some(Template::LivePatchingSystem));
        form.set(FieldKey::ClientId, serde_json::json!(1));
        form.set(FieldKey::KernelId, serde_json::json!(456));

        assert!(form.kernel_becomes(None).await);
        form.fields.settle().await;

        let view = form
            .fields
            .render(&FilterFieldsProps::new(Template::LivePatchingSystem))
            .unwrap();
        assert!(view.client.unwrap().options.is_empty());
        assert!(view.kernel.options.is_empty());
        assert!(view.kernel.disabled);
        form.unmount().await;
    }

    #[tokio::test]
    async fn test_kernel_failure_only_affects_kernels() {
        let providers = Providers::from_catalog(Arc::new(StaticCatalog::placeholder()))
            .with_kernels(Arc::new(FailingProvider::new("kernel index offline")));
        let form = FormHarness::mount(providers);
        form.template(Some(Template::LivePatchingProduct));
        form.set(FieldKey::ProductId, serde_json::json!(1));
        form.fields.settle().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        form.fields.settle().await;

        let view = form
            .fields
            .render(&FilterFieldsProps::new(Template::LivePatchingProduct))
            .unwrap();
        assert_eq!(view.product.unwrap().options[0].label, "SLES product 1");
        assert!(view.kernel.disabled);
        assert_eq!(form.kernel(), None);
        form.unmount().await;
    }
}

// =============================================================================
// TEAR-DOWN
// =============================================================================

#[cfg(test)]
mod tear_down {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unmount_before_load_resolves() {
        let catalog = StaticCatalog::from_json(CATALOG)
            .unwrap()
            .with_latency(Duration::from_millis(50));
        let form = FormHarness::with_catalog(catalog);
        let model = form.model.clone();

        form.set(FieldKey::ClientId, serde_json::json!(1));
        form.template(Some(Template::LivePatchingSystem));
        tokio::time::sleep(Duration::from_millis(10)).await;
        form.unmount().await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(model.writes_to("kernelId"), 0);
    }
}
