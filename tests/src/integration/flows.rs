//! # Integration Test Flows
//!
//! Flows that cross crate boundaries outside the form bus:
//!
//! 1. **Catalog file → sub-form**: a catalog loaded from disk drives kernel selection
//! 2. **junit-runner over `local:`**: real processes framed by JUnit markers
//! 3. **Telemetry**: filter activity shows up in the exported metrics

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;

    use futures::StreamExt;

    use cm_01_live_patching_filter::{
        FilterFieldsApi, FilterFieldsProps, FormContext, FormState, LivePatchingFilterFields,
        ModelWriter, Providers, SharedFormModel, StaticCatalog,
    };
    use cm_telemetry::{encode_metrics, register_metrics};
    use junit_runner::marker::MARKER_PREFIX;
    use junit_runner::{Role, SuiteConfig, SuiteRunner, Targets};
    use shared_bus::{EventFilter, EventStream, EventTopic, FormEvent, InMemoryFormBus};
    use shared_types::{EntityId, FieldKey, Template};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn keywords(output: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(output)
            .lines()
            .filter_map(|line| line.strip_prefix(MARKER_PREFIX))
            .filter_map(|rest| rest.split_whitespace().next().map(str::to_string))
            .collect()
    }

    fn local_suite(command: &str) -> SuiteConfig {
        SuiteConfig {
            group: "LOCAL SMOKE".to_string(),
            role: Role::Client,
            command: command.to_string(),
            case: "SMOKE".to_string(),
            timeout: Duration::from_secs(10),
            ..SuiteConfig::default()
        }
    }

    // =============================================================================
    // CATALOG FILE
    // =============================================================================

    #[tokio::test]
    async fn test_catalog_file_drives_kernel_selection() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "products": [{{ "id": 3, "name": "SLE Micro" }}],
                 "kernels": {{ "*": [{{ "id": 11, "version": "6.4.0" }}, {{ "id": 12, "version": "6.4.1", "default": true }}] }} }}"#
        )
        .unwrap();

        let catalog = StaticCatalog::load(file.path()).unwrap();
        let model = Arc::new(SharedFormModel::new());
        let fields = LivePatchingFilterFields::new(
            FormContext::shared(model.clone()),
            Providers::from_catalog(Arc::new(catalog)),
        );

        model.set_model_value("productId", serde_json::json!(3));
        let props = FilterFieldsProps::new(Template::LivePatchingProduct);
        fields.render(&props);
        fields.settle().await;

        assert_eq!(model.id(FieldKey::KernelId), Some(EntityId(12)));
        let view = fields.render(&props).unwrap();
        assert_eq!(view.product.unwrap().selected_label(), Some("SLE Micro"));
    }

    #[tokio::test]
    async fn test_event_stream_sees_kernel_write() {
        let bus = Arc::new(InMemoryFormBus::new());
        let mut stream = bus.event_stream(
            EventFilter::topics(vec![EventTopic::Model]).with_keys(&[FieldKey::KernelId]),
        );
        let model = Arc::new(SharedFormModel::new().with_publisher(bus.clone()));
        let fields = LivePatchingFilterFields::new(
            FormContext::shared(model.clone()),
            Providers::from_catalog(Arc::new(StaticCatalog::placeholder())),
        );

        model.set_model_value("clientId", serde_json::json!(3));
        fields.render(&FilterFieldsProps::new(Template::LivePatchingSystem));

        let event = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .unwrap();
        assert_eq!(
            event,
            Some(FormEvent::value_changed(FieldKey::KernelId, serde_json::json!(456)))
        );
    }

    // =============================================================================
    // JUNIT RUNNER
    // =============================================================================

    #[tokio::test]
    async fn test_local_suite_success() {
        let targets = Targets::from_specs(Some("local:"), None, None).unwrap();
        let mut runner = SuiteRunner::new(Vec::new());

        let summary = runner
            .run_suite(&local_suite("echo family=sles15"), &targets)
            .await
            .unwrap();

        assert!(summary.all_passed());
        let output = runner.into_inner();
        assert_eq!(keywords(&output), vec!["testsuite", "testcase", "success", "endsuite"]);
        assert!(String::from_utf8_lossy(&output).contains("family=sles15\n"));
    }

    #[tokio::test]
    async fn test_local_suite_failure() {
        let targets = Targets::from_specs(Some("local:"), None, None).unwrap();
        let mut runner = SuiteRunner::new(Vec::new());

        let summary = runner
            .run_suite(&local_suite("exit 4"), &targets)
            .await
            .unwrap();

        assert!(!summary.all_passed());
        assert_eq!(
            keywords(&runner.into_inner()),
            vec!["testsuite", "testcase", "failure", "endsuite"]
        );
    }

    // =============================================================================
    // TELEMETRY
    // =============================================================================

    #[tokio::test]
    async fn test_kernel_loads_are_exported() {
        register_metrics().unwrap();
        let model = Arc::new(SharedFormModel::new());
        let fields = LivePatchingFilterFields::new(
            FormContext::shared(model.clone()),
            Providers::from_catalog(Arc::new(StaticCatalog::placeholder())),
        );

        model.set_model_value("clientId", serde_json::json!(1));
        fields.render(&FilterFieldsProps::new(Template::LivePatchingSystem));
        fields.settle().await;

        let text = encode_metrics().unwrap();
        assert!(text.contains("cm_filter_kernel_loads_total"));
        assert!(text.contains("cm_filter_kernel_load_duration_seconds"));
    }
}
