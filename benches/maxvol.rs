use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rusty_maxvol::prelude::*;

fn bench_maxvol(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let mut group = c.benchmark_group("maxvol");

    for &dimension in [(1000, 30), (5000, 50)].iter() {
        let mat = f64::random_uniform(dimension, &mut rng);
        let id = format!("{}x{}", dimension.0, dimension.1);

        group.bench_with_input(BenchmarkId::new("square", &id), &mat, |b, mat| {
            b.iter(|| maxvol_with_tol(mat.view(), 1.05).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("rect", &id), &mat, |b, mat| {
            b.iter(|| rect_maxvol_with_tol(mat.view(), 1.5).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_maxvol);
criterion_main!(benches);
