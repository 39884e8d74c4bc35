use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use seeds_types::{Address, CoinObject, ObjectDigest, ObjectId, TokenAmount};
use seeds_wallet_core::select_coins;

fn inventory(n: usize) -> Vec<CoinObject> {
    (0..n)
        .map(|i| {
            let mut id = [0u8; 32];
            id[..8].copy_from_slice(&(i as u64).to_be_bytes());
            CoinObject {
                object_id: ObjectId::new(id),
                version: 1,
                digest: ObjectDigest::new(id),
                // Spread balances so sorting has work to do.
                balance: TokenAmount::from((i as u64 * 7_919) % 1_000_003 + 1),
                owner: Address::ZERO,
            }
        })
        .collect()
}

fn select_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_coins");
    for n in [10usize, 100, 1_000] {
        let coins = inventory(n);
        let total: TokenAmount = coins.iter().map(|c| c.balance).sum();
        // Half the inventory forces a multi-coin merge.
        let requested = TokenAmount::new(total.raw() / 2);
        group.bench_with_input(BenchmarkId::from_parameter(n), &coins, |b, coins| {
            b.iter(|| select_coins(black_box(coins), black_box(requested)))
        });
    }
    group.finish();
}

criterion_group!(benches, select_bench);
criterion_main!(benches);
