//! Benchmark for the sale path: pricing, ledger credit, experience and stats.
//!
//! Run with: cargo bench --package guildhall_jobs --bench sell_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use guildhall_jobs::{
    EngineConfig, EngineContext, JobClass, JobService, MemoryLedger, MemoryPlayerStore, NullSink,
    Rules, SellService,
};
use std::sync::Arc;

const CONFIG: &str = include_str!("../../../data/schemas/jobs.toml");

fn create_engine(players: u64) -> (JobService, SellService) {
    let rules = match EngineConfig::from_toml_str(CONFIG).and_then(|c| Rules::from_config(&c)) {
        Ok(rules) => rules,
        Err(err) => panic!("shipped configuration rejected: {err}"),
    };
    let ctx = EngineContext::new(
        Arc::new(rules),
        Arc::new(MemoryPlayerStore::new()),
        Arc::new(MemoryLedger::new()),
        Arc::new(NullSink),
    );
    let jobs = JobService::new(ctx.clone());
    for player in 0..players {
        let _ = jobs.select_job(player, JobClass::Miner);
    }
    (jobs, SellService::new(ctx))
}

fn benchmark_single_sale(c: &mut Criterion) {
    let (_jobs, shop) = create_engine(1);

    c.bench_function("single_sale", |b| {
        b.iter(|| black_box(shop.sell(black_box(0), "iron_ore", black_box(16))));
    });
}

fn benchmark_quote(c: &mut Criterion) {
    let (_jobs, shop) = create_engine(1);

    c.bench_function("quote_sell", |b| {
        b.iter(|| black_box(shop.quote_sell(black_box(0), "gold_ore", black_box(64))));
    });
}

fn benchmark_many_players(c: &mut Criterion) {
    let (_jobs, shop) = create_engine(1_000);

    let mut group = c.benchmark_group("many_players");
    group.throughput(Throughput::Elements(10_000));
    group.sample_size(10);

    group.bench_function("10k_sales_1k_players", |b| {
        b.iter(|| {
            for i in 0..10_000u64 {
                black_box(shop.sell(i % 1_000, "coal", 1));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_sale,
    benchmark_quote,
    benchmark_many_players
);
criterion_main!(benches);
