use criterion::{black_box, criterion_group, criterion_main, Criterion};
use umbra_types::{Secret, VoteChoice};

fn commit_bench(c: &mut Criterion) {
    let secret = Secret::from_bytes([0x42; 32]);

    c.bench_function("vote_commit", |b| {
        b.iter(|| umbra_crypto::commit(black_box(VoteChoice::Yes), black_box(&secret)))
    });
}

fn verify_commitment_bench(c: &mut Criterion) {
    let secret = Secret::from_bytes([0x42; 32]);
    let commitment = umbra_crypto::commit(VoteChoice::No, &secret);

    c.bench_function("vote_verify_commitment", |b| {
        b.iter(|| {
            umbra_crypto::verify_commitment(black_box(VoteChoice::No), &secret, &commitment)
        })
    });
}

fn tagged_hash_bench(c: &mut Criterion) {
    let data = [0xABu8; 256];

    c.bench_function("tagged_hash_256B", |b| {
        b.iter(|| umbra_crypto::tagged_hash("umbra/bench", &[black_box(&data[..])]))
    });
}

criterion_group!(
    benches,
    commit_bench,
    verify_commitment_bench,
    tagged_hash_bench
);
criterion_main!(benches);
