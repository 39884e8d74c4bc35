use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn ed25519_sign_bench(c: &mut Criterion) {
    let kp = seeds_crypto::keypair_from_seed(&[7u8; 32]);
    let msg = [42u8; 128];

    c.bench_function("ed25519_sign_128B", |b| {
        b.iter(|| seeds_crypto::sign_message(black_box(&msg), &kp.private))
    });
}

fn sign_transaction_bench(c: &mut Criterion) {
    let signer = seeds_crypto::AdminSigner::from_seed([7u8; 32]);
    let tx_bytes = vec![0xABu8; 512];

    c.bench_function("sign_transaction_512B", |b| {
        b.iter(|| signer.sign_transaction(black_box(&tx_bytes)))
    });
}

fn blake2b_256_bench(c: &mut Criterion) {
    let data = [0xABu8; 256];

    c.bench_function("blake2b_256_256B", |b| {
        b.iter(|| seeds_crypto::blake2b_256(black_box(&data)))
    });
}

fn decode_key_bench(c: &mut Criterion) {
    let key = format!("0x{}", "11".repeat(32));

    c.bench_function("decode_private_key_hex", |b| {
        b.iter(|| seeds_crypto::decode_private_key(black_box(&key)))
    });
}

criterion_group!(
    benches,
    ed25519_sign_bench,
    sign_transaction_bench,
    blake2b_256_bench,
    decode_key_bench,
);
criterion_main!(benches);
