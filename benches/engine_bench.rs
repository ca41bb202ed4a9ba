//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use avl_drill::*;

fn shuffled(n: i64) -> Vec<Key> {
    // Multiplicative hashing gives a fixed permutation of 0..n for odd multipliers mod 2^k
    let m = (n as u64).next_power_of_two();
    (0..m)
        .map(|i| (i.wrapping_mul(2_654_435_761) % m) as Key)
        .filter(|&v| v < n)
        .collect()
}

fn benchmark_automatic_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("automatic_insert");
    for n in [64i64, 512, 2048] {
        let keys = shuffled(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &keys, |b, keys| {
            b.iter(|| {
                let mut engine = Engine::new(SessionConfig::automatic().without_steps());
                for &k in keys {
                    let _ = engine.apply(Request::Insert(black_box(k)));
                }
                black_box(engine.tree().height())
            });
        });
    }
    group.finish();
}

fn benchmark_correction_sequence(c: &mut Criterion) {
    let mut tree = AvlTree::new();
    for k in 0..512 {
        let _ = tree.insert_raw(k);
    }
    let path = tree.find_path_to_root(511);

    c.bench_function("correction_sequence_chain_512", |b| {
        b.iter(|| black_box(oracle::build_correction_sequence(black_box(&tree), &path)))
    });
}

fn benchmark_render(c: &mut Criterion) {
    let mut engine = Engine::new(SessionConfig::automatic().without_steps());
    for k in shuffled(255) {
        let _ = engine.apply(Request::Insert(k));
    }

    c.bench_function("render_255", |b| {
        b.iter(|| black_box(render(engine.tree()).to_string()))
    });
}

criterion_group!(
    benches,
    benchmark_automatic_inserts,
    benchmark_correction_sequence,
    benchmark_render
);
criterion_main!(benches);
