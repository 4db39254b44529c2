//! # Content-Management Filter Benchmarks
//!
//! | Component | Path | Expectation |
//! |-----------|------|-------------|
//! | cm-01 Live Patching | default kernel selection | linear in list length |
//! | cm-01 Live Patching | field rendering | < 1ms for 500 options |
//! | cm-01 Live Patching | re-derivation churn | stale loads never commit |

use criterion::{criterion_group, criterion_main, Criterion};
use std::time::Duration;

use cm_tests::benchmarks::cm_01_live_patching;

fn configured() -> Criterion {
    Criterion::default().measurement_time(Duration::from_secs(5))
}

fn bench_live_patching(c: &mut Criterion) {
    cm_01_live_patching::register_benchmarks(c);
}

criterion_group!(
    name = benches;
    config = configured();
    targets = bench_live_patching
);

criterion_main!(benches);
