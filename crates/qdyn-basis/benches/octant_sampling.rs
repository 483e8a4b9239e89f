use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qdyn_basis::AngleSampler;

fn octant_bench(c: &mut Criterion) {
    c.bench_function("octant_batch_8192", |b| {
        b.iter(|| {
            let mut sampler = AngleSampler::from_seed(42);
            black_box(sampler.sample_batch(8192));
        });
    });
}

criterion_group!(benches, octant_bench);
criterion_main!(benches);
