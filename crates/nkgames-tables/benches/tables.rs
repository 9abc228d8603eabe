//! NK game-table benchmarks
//!
//! Critical paths:
//! - Landscape evaluation across N and K
//! - Coalition enumeration
//! - Constrained search table building
//! - Social learning table building

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use nkgames_common::{create_agents, Design};
use nkgames_dynamics::{
    LocalSearchConfig, NetworkFactory, NetworkParams, NetworkTopology, SimulationConfig,
};
use nkgames_landscape::NkLandscape;
use nkgames_tables::{
    coalition_count, CoalitionEnumerator, ConstrainedTableBuilder, SocialTableBuilder,
};

// ============ LANDSCAPE BENCHMARKS ============

fn bench_landscape_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("landscape");

    for (n, k) in [(10, 2), (20, 5), (40, 8)].iter() {
        let landscape = NkLandscape::random(*n, *k, 42).expect("landscape");
        let design = Design::zeros(*n);
        group.throughput(Throughput::Elements(*n as u64));
        group.bench_with_input(
            BenchmarkId::new("evaluate", format!("N{}_K{}", n, k)),
            &design,
            |b, design| b.iter(|| landscape.evaluate(black_box(design))),
        );
    }

    group.finish();
}

// ============ ENUMERATION BENCHMARKS ============

fn bench_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("coalitions");

    for players in [8usize, 12, 16].iter() {
        group.throughput(Throughput::Elements(coalition_count(*players, None) as u64));
        group.bench_with_input(BenchmarkId::new("enumerate", players), players, |b, &n| {
            b.iter(|| CoalitionEnumerator::new(black_box(n), None).count())
        });
    }

    group.finish();
}

// ============ TABLE BENCHMARKS ============

fn bench_constrained_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("constrained_table");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    let landscape = NkLandscape::random(8, 3, 7).expect("landscape");
    for max_size in [1usize, 2, 3].iter() {
        group.bench_with_input(
            BenchmarkId::new("max_size", max_size),
            max_size,
            |b, &max_size| {
                b.iter(|| {
                    ConstrainedTableBuilder::new(
                        &landscape,
                        Design::zeros(8),
                        None,
                        LocalSearchConfig::default(),
                        1,
                    )
                    .expect("builder")
                    .trials(3)
                    .build_table(Some(max_size))
                })
            },
        );
    }

    group.finish();
}

fn bench_social_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("social_table");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    let landscape = NkLandscape::random(6, 2, 7).expect("landscape");
    let agents = create_agents(6);
    let graph = NetworkFactory::new(NetworkTopology::Complete, 0)
        .build(6, &NetworkParams::default())
        .expect("graph");
    let config = SimulationConfig {
        rounds: 50,
        ..Default::default()
    };

    group.bench_function("complete_N6_size2", |b| {
        b.iter(|| {
            SocialTableBuilder::new(&landscape, &agents, &graph, config.clone(), 1)
                .runs(2)
                .build_table(Some(2))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_landscape_evaluate,
    bench_enumeration,
    bench_constrained_table,
    bench_social_table,
);

criterion_main!(benches);
