//! Criterion benchmarks for u-fairalloc allocators.
//!
//! Uses seeded random valuations so every run measures the same instances.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_fairalloc::instance::{DiscreteInstance, DivisibleInstance, Valuations};
use u_fairalloc::leximin::LeximinSolver;
use u_fairalloc::matching::{IteratedMatchingRunner, MatchingConfig};
use u_fairalloc::normalize::{Normalizer, NormalizerConfig};
use u_fairalloc::sharing::BoundedSharingAllocator;
use u_fairalloc::RunContext;

// ===========================================================================
// Synthetic instances
// ===========================================================================

fn random_valuations(agents: usize, items: usize, seed: u64) -> Valuations {
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..agents)
        .map(|_| (0..items).map(|_| rng.random_range(1.0..100.0)).collect())
        .collect();
    Valuations::new(
        (0..agents).map(|a| format!("a{a}")).collect(),
        (0..items).map(|o| format!("o{o}")).collect(),
        values,
    )
    .expect("valid synthetic valuations")
}

fn divisible(agents: usize, items: usize) -> DivisibleInstance {
    let raw = random_valuations(agents, items, 42);
    let entitlements = (1..=agents).map(|e| e as f64).collect();
    DivisibleInstance::new(&raw, entitlements, &Normalizer::default()).expect("valid instance")
}

fn discrete(agents: usize, items: usize) -> DiscreteInstance {
    let raw = random_valuations(agents, items, 7);
    let normalizer = Normalizer::new(NormalizerConfig::fixed_sum(1000.0)).expect("valid config");
    let seats = vec![(agents / 2).max(1) as u32; items];
    DiscreteInstance::normalized(&raw, vec![4; agents], seats, &normalizer)
        .expect("valid instance")
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_leximin(c: &mut Criterion) {
    let mut group = c.benchmark_group("leximin");
    group.sample_size(10);

    for (n, m) in [(4usize, 8usize), (8, 16), (12, 24)] {
        let instance = divisible(n, m);
        let ctx = RunContext::default();
        group.bench_with_input(
            BenchmarkId::new(format!("n{n}_m{m}"), n),
            &(instance, ctx),
            |b, (i, c)| {
                b.iter(|| {
                    let result = LeximinSolver::solve(black_box(i), black_box(c));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_bounded_sharing(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_sharing");
    group.sample_size(10);

    for (n, m) in [(4usize, 8usize), (8, 16), (12, 24)] {
        let instance = divisible(n, m);
        let ctx = RunContext::default();
        let thresholds = LeximinSolver::solve(&instance, &ctx).expect("leximin").profile;
        group.bench_with_input(
            BenchmarkId::new(format!("n{n}_m{m}"), n),
            &(instance, thresholds, ctx),
            |b, (i, t, c)| {
                b.iter(|| {
                    let result =
                        BoundedSharingAllocator::allocate(black_box(i), black_box(t), black_box(c));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_iterated_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterated_matching");
    group.sample_size(10);

    for &(n, m) in &[(10usize, 6usize), (40, 12), (100, 20)] {
        let instance = discrete(n, m);
        let config = MatchingConfig::default();
        let ctx = RunContext::default();
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(instance, config, ctx),
            |b, (i, cfg, c)| {
                b.iter(|| {
                    let result =
                        IteratedMatchingRunner::run(black_box(i), black_box(cfg), black_box(c));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_leximin, bench_bounded_sharing, bench_iterated_matching);
criterion_main!(benches);
