use chrono::Utc;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kinrec_embedstore::{EnrollmentRecord, RecordId};
use kinrec_matcher::select_best;

fn random_unit_vec(dim: usize, seed: u64) -> Vec<f32> {
    let mut v = Vec::with_capacity(dim);
    let mut state = seed;
    for _ in 0..dim {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        v.push(((state >> 33) as f32) / (u32::MAX as f32) - 0.5);
    }
    kinrec_vecmath::l2_normalize(&mut v);
    v
}

fn make_partition(dim: usize, n: usize) -> Vec<EnrollmentRecord> {
    let now = Utc::now();
    (0..n)
        .map(|i| EnrollmentRecord {
            id: RecordId(i as u64 + 1),
            owner_id: format!("member:{:03}", i / 3),
            partition_key: "patient".to_string(),
            vector: random_unit_vec(dim, i as u64 + 1),
            created_at: now,
        })
        .collect()
}

fn bench_select_best(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_best");
    for (dim, n) in [(512, 30), (512, 300), (240, 300)] {
        let records = make_partition(dim, n);
        let query = random_unit_vec(dim, 42);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{dim}d_{n}")),
            &records,
            |b, records| b.iter(|| select_best(black_box(&query), records, 0.6)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_select_best);
criterion_main!(benches);
