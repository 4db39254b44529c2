//! # CM-01 Live Patching Filter Benchmarks
//!
//! Hot paths of the sub-form:
//! - Default kernel selection over long kernel lists
//! - Field rendering, run on every form event
//! - Kernel re-derivation churn while the user flips between clients

use cm_01_live_patching_filter::{
    render_fields, select_default_kernel, FilterFieldsApi, FilterFieldsProps, FormContext,
    KernelStatus, LivePatchingFilterFields, ModelSelection, Providers, SelectionSnapshot,
    SharedFormModel, StaticCatalog,
};
use cm_01_live_patching_filter::ModelWriter;
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use shared_types::{Client, EntityId, Kernel, KernelScope, Product, Template};
use std::sync::Arc;

fn kernels(count: u64, default_at: Option<u64>) -> Vec<Kernel> {
    (0..count)
        .map(|i| {
            let kernel = Kernel::new(1000 + i, format!("5.14.21-{i}"));
            if Some(i) == default_at {
                kernel.as_default()
            } else {
                kernel
            }
        })
        .collect()
}

pub fn default_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("cm-01-default-selection");

    for size in [10u64, 100, 1_000, 10_000] {
        // Worst case: the default is the last entry.
        let list = kernels(size, Some(size - 1));
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("last_default", size), &list, |b, list| {
            b.iter(|| black_box(select_default_kernel(list)))
        });
    }

    group.finish();
}

pub fn field_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("cm-01-render-fields");

    for size in [10u64, 500] {
        let snapshot = SelectionSnapshot {
            clients: (1..=size).map(|id| Client::new(id, format!("client-{id}"))).collect(),
            products: (1..=size).map(|id| Product::new(id, format!("product-{id}"))).collect(),
            kernels: kernels(size, Some(0)),
            kernel_status: KernelStatus::Ready(KernelScope::Client(EntityId(1))),
        };
        let selection = ModelSelection {
            client_id: Some(EntityId(1)),
            product_id: None,
            kernel_id: Some(EntityId(1000)),
        };

        group.bench_with_input(BenchmarkId::new("system", size), &snapshot, |b, snapshot| {
            b.iter(|| {
                black_box(render_fields(
                    Template::LivePatchingSystem,
                    false,
                    selection,
                    snapshot,
                ))
            })
        });
    }

    group.finish();
}

pub fn rederivation_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("cm-01-rederivation");
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(_) => return,
    };

    group.bench_function("flip_clients_100", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let model = Arc::new(SharedFormModel::new());
                let fields = LivePatchingFilterFields::new(
                    FormContext::shared(model.clone()),
                    Providers::from_catalog(Arc::new(StaticCatalog::placeholder())),
                );
                let props = FilterFieldsProps::new(Template::LivePatchingSystem);
                for i in 0..100u64 {
                    model.set_model_value("clientId", json!(i % 3 + 1));
                    fields.render(&props);
                }
                fields.settle().await;
                black_box(fields.render(&props))
            })
        })
    });

    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    default_selection(c);
    field_rendering(c);
    rederivation_churn(c);
}
