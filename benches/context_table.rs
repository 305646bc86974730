//! Micro-benchmark for the chained hash table's lookup and insert paths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tetragram::ContextTable;

fn random_names(count: usize, seed: u64) -> Vec<[u32; 4]> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            [
                rng.gen_range(0..0x10FFFFu32),
                rng.gen_range(0..0x10FFFFu32),
                rng.gen_range(0..0x10FFFFu32),
                rng.gen_range(0..0x10FFFFu32),
            ]
        })
        .collect()
}

fn bench_lookup_or_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_or_create");
    for bucket_bits in [8u32, 12, 16] {
        let names = random_names(10_000, 42);
        group.bench_with_input(
            BenchmarkId::from_parameter(bucket_bits),
            &bucket_bits,
            |b, &bits| {
                b.iter(|| {
                    let mut table = ContextTable::new(bits).unwrap();
                    for name in &names {
                        table
                            .lookup_or_create(black_box(*name))
                            .unwrap()
                            .associate(b'x' as u32)
                            .unwrap();
                    }
                    table.rule_count()
                });
            },
        );
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let names = random_names(10_000, 7);
    let mut table = ContextTable::new(14).unwrap();
    for name in &names {
        table.lookup_or_create(*name).unwrap().associate(1).unwrap();
    }
    c.bench_function("lookup_hit", |b| {
        b.iter(|| {
            let mut found = 0usize;
            for name in &names {
                if table.lookup(black_box(name)).is_some() {
                    found += 1;
                }
            }
            found
        });
    });
}

criterion_group!(benches, bench_lookup_or_create, bench_lookup);
criterion_main!(benches);
