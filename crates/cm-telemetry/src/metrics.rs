//! Prometheus metrics for the filter components.
//!
//! All metrics follow the naming convention: `cm_<component>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // LIVE PATCHING FILTER METRICS
    // =========================================================================

    /// Kernel loads issued by the selection controller
    pub static ref KERNEL_LOADS: Counter = Counter::new(
        "cm_filter_kernel_loads_total",
        "Total number of kernel loads issued"
    ).expect("metric creation failed");

    /// Provider results discarded because a newer request superseded them
    pub static ref STALE_RESULTS: Counter = Counter::new(
        "cm_filter_stale_results_total",
        "Provider results discarded as stale"
    ).expect("metric creation failed");

    /// Provider failures by provider kind
    pub static ref PROVIDER_FAILURES: CounterVec = CounterVec::new(
        Opts::new("cm_filter_provider_failures_total", "Provider failures by provider"),
        &["provider"]  // clients / products / kernels
    ).expect("metric creation failed");

    /// Kernel load latency
    pub static ref KERNEL_LOAD_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "cm_filter_kernel_load_duration_seconds",
            "Time spent waiting for the kernel provider"
        ).buckets(exponential_buckets(0.001, 2.0, 12).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // JUNIT RUNNER METRICS
    // =========================================================================

    /// Testcases executed by the runner
    pub static ref RUNNER_TESTCASES: CounterVec = CounterVec::new(
        Opts::new("cm_runner_testcases_total", "Testcases executed by outcome"),
        &["outcome"]  // success / failure
    ).expect("metric creation failed");
}

/// Handle for the metrics registry
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already registered collectors are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Filter
        Box::new(KERNEL_LOADS.clone()),
        Box::new(STALE_RESULTS.clone()),
        Box::new(PROVIDER_FAILURES.clone()),
        Box::new(KERNEL_LOAD_DURATION.clone()),
        // Runner
        Box::new(RUNNER_TESTCASES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
