use carmine_tree::RBTreeMap;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;

const N: usize = 10_000;

// Helper to generate a deterministic pseudo-random key sequence.

fn random_keys(n: usize) -> Vec<i64> {
    // Simple LCG, no external randomness needed.
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

// Map benchmarks.

fn bench_insert_ordered(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_ordered");

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter(|| {
            let mut map = RBTreeMap::new();
            for i in 0..N as i64 {
                let _ = map.insert(i, i);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for i in 0..N as i64 {
                map.insert(i, i);
            }
            map
        });
    });

    group.finish();
}

fn bench_insert_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_random");
    let keys = random_keys(N);

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter(|| {
            let mut map = RBTreeMap::new();
            for &k in &keys {
                let _ = map.insert(k, k);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_get_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_random");
    let keys = random_keys(N);

    let mut rb_map = RBTreeMap::new();
    let mut bt_map = BTreeMap::new();
    for &k in &keys {
        let _ = rb_map.insert(k, k);
        bt_map.insert(k, k);
    }

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter(|| {
            let mut found = 0usize;
            for k in &keys {
                if rb_map.get(k).is_some() {
                    found += 1;
                }
            }
            found
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut found = 0usize;
            for k in &keys {
                if bt_map.get(k).is_some() {
                    found += 1;
                }
            }
            found
        });
    });

    group.finish();
}

fn bench_remove_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_random");
    let keys = random_keys(N);

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter_with_setup(
            || {
                let mut map = RBTreeMap::new();
                for &k in &keys {
                    let _ = map.insert(k, k);
                }
                map
            },
            |mut map| {
                for k in &keys {
                    map.remove(k);
                }
                map
            },
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_with_setup(
            || {
                let mut map = BTreeMap::new();
                for &k in &keys {
                    map.insert(k, k);
                }
                map
            },
            |mut map| {
                for k in &keys {
                    map.remove(k);
                }
                map
            },
        );
    });

    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");
    let keys = random_keys(N);

    let mut rb_map = RBTreeMap::new();
    let mut bt_map = BTreeMap::new();
    for &k in &keys {
        let _ = rb_map.insert(k, k);
        bt_map.insert(k, k);
    }

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter(|| rb_map.iter().map(|(_, &v)| v).sum::<i64>());
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| bt_map.iter().map(|(_, &v)| v).sum::<i64>());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_ordered,
    bench_insert_random,
    bench_get_random,
    bench_remove_random,
    bench_iterate
);
criterion_main!(benches);
