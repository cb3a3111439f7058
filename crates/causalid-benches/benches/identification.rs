//! # causalid Benchmarks
//!
//! - All-style back-door search (power-set enumeration, parallel with the
//!   `parallel` feature)
//! - ID algorithm on layered graphs with confounded layers
//!

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use causalid_core::engine::backdoor::get_backdoor_set;
use causalid_benches::create_layered_graph;
use causalid_core::{id, var_set, AdjustmentConfig, AdjustmentStyle};

fn bench_backdoor_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("backdoor_all");
    let (x, y) = (var_set(["X"]), var_set(["Y"]));

    for width in [4usize, 8, 12].iter() {
        let graph = create_layered_graph(*width, 3).expect("layered graph");
        group.throughput(Throughput::Elements(1u64 << *width));
        group.bench_with_input(BenchmarkId::from_parameter(width), width, |b, _| {
            b.iter(|| {
                black_box(get_backdoor_set(
                    &graph,
                    &x,
                    &y,
                    AdjustmentStyle::All,
                    AdjustmentConfig::default(),
                ))
            });
        });
    }

    group.finish();
}

fn bench_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("id_algorithm");
    let (x, y) = (var_set(["X"]), var_set(["Y"]));

    for depth in [2usize, 8, 32].iter() {
        let graph = create_layered_graph(4, *depth).expect("layered graph");
        let joint = graph.joint();
        group.throughput(Throughput::Elements(graph.nodes().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, _| {
            b.iter(|| black_box(id(&y, &x, &joint, &graph)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_backdoor_all, bench_id);
criterion_main!(benches);
